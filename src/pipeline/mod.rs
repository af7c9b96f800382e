//! Task composition: series stages, parallel groups and the watch stage.
//!
//! ```text
//! development: clean -> parallel(markup, scripts, fonts, images, webp, sprite, resources) -> styles -> watch
//! production:  clean -> parallel(markup, scripts, fonts, images, webp, sprite, resources) -> styles -> images-optimize
//! ```
//!
//! A stage starts only after the previous one has finished. Tasks of a
//! parallel group run on the rayon pool; a hard error in any of them aborts
//! the pipeline once the whole group has joined.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::logger::ProgressLine;
use crate::reload::ReloadHandle;
use crate::task::{self, Failure, TaskContext, TaskName, TaskOutcome};
use crate::{log, serve};

/// Tasks that only read sources and write disjoint outputs.
const PARALLEL_GROUP: [TaskName; 7] = [
    TaskName::Markup,
    TaskName::Scripts,
    TaskName::Fonts,
    TaskName::Images,
    TaskName::Webp,
    TaskName::Sprite,
    TaskName::Resources,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Task(TaskName),
    Parallel(Vec<TaskName>),
    /// Serve the output tree and rerun tasks on change, until Ctrl+C
    Watch,
}

impl Stage {
    fn describe(&self) -> String {
        match self {
            Self::Task(name) => name.to_string(),
            Self::Parallel(names) => {
                let names: Vec<_> = names.iter().copied().map(TaskName::as_str).collect();
                format!("parallel({})", names.join(", "))
            }
            Self::Watch => "watch".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: &'static str,
    pub mode: BuildMode,
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// `dev`: build everything, then serve and watch.
    pub fn development() -> Self {
        Self {
            name: "dev",
            mode: BuildMode::DEVELOPMENT,
            stages: vec![
                Stage::Task(TaskName::Clean),
                Stage::Parallel(PARALLEL_GROUP.to_vec()),
                Stage::Task(TaskName::Styles),
                Stage::Watch,
            ],
        }
    }

    /// `build`: production variants, then image optimization.
    pub fn production() -> Self {
        Self {
            name: "build",
            mode: BuildMode::PRODUCTION,
            stages: vec![
                Stage::Task(TaskName::Clean),
                Stage::Parallel(PARALLEL_GROUP.to_vec()),
                Stage::Task(TaskName::Styles),
                Stage::Task(TaskName::ImagesOptimize),
            ],
        }
    }

    /// `run`: the given tasks in series.
    pub fn standalone(tasks: &[TaskName], mode: BuildMode) -> Self {
        Self {
            name: "run",
            mode,
            stages: tasks.iter().copied().map(Stage::Task).collect(),
        }
    }

    /// `clean -> parallel(markup, ...) -> styles -> watch`
    pub fn describe(&self) -> String {
        self.stages
            .iter()
            .map(Stage::describe)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn run(&self, config: &PipelineConfig) -> Result<PipelineReport> {
        let start = Instant::now();
        log!(self.name; "{} ({})", self.describe(), self.mode.name());

        // created before the first task so failures of the initial build
        // are queued for clients that connect later
        let mut watch = self
            .stages
            .contains(&Stage::Watch)
            .then(ReloadHandle::channel);
        let reload = watch.as_ref().map(|(handle, _)| handle.clone());

        let mut ctx = TaskContext::new(config, self.mode);
        if let Some(reload) = &reload {
            ctx = ctx.with_reload(reload);
        }

        let mut report = PipelineReport::default();
        for stage in &self.stages {
            match stage {
                Stage::Task(name) => {
                    let outcome = task::run(*name, &ctx)?;
                    report.push(*name, outcome);
                }
                Stage::Parallel(names) => {
                    for (name, outcome) in run_parallel(names, &ctx)? {
                        report.push(name, outcome);
                    }
                }
                Stage::Watch => {
                    report.log_summary(self.name, start);
                    let Some((handle, ws_rx)) = watch.take() else {
                        continue;
                    };
                    serve::run(Arc::new(config.clone()), handle, ws_rx)?;
                    return Ok(report);
                }
            }
        }

        report.log_summary(self.name, start);
        Ok(report)
    }
}

/// Run a group to completion, then surface the first hard error.
fn run_parallel(names: &[TaskName], ctx: &TaskContext<'_>) -> Result<Vec<(TaskName, TaskOutcome)>> {
    let progress = ProgressLine::new("tasks", &[("done", names.len())]);

    let results: Vec<(TaskName, Result<TaskOutcome>)> = names
        .par_iter()
        .map(|&name| {
            let result = task::run(name, ctx);
            progress.inc("done");
            (name, result)
        })
        .collect();
    progress.finish();

    results
        .into_iter()
        .map(|(name, result)| result.map(|outcome| (name, outcome)))
        .collect()
}

/// Outcome of every task that ran, in pipeline order.
#[derive(Debug, Default)]
pub struct PipelineReport {
    outcomes: Vec<(TaskName, TaskOutcome)>,
}

impl PipelineReport {
    fn push(&mut self, name: TaskName, outcome: TaskOutcome) {
        self.outcomes.push((name, outcome));
    }

    #[cfg(test)]
    pub fn outcomes(&self) -> &[(TaskName, TaskOutcome)] {
        &self.outcomes
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| outcome.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = (TaskName, &Failure)> {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            TaskOutcome::Failed(failure) => Some((*name, failure)),
            TaskOutcome::Done { .. } => None,
        })
    }

    fn written(&self) -> usize {
        self.outcomes.iter().map(|(_, o)| o.written().len()).sum()
    }

    fn log_summary(&self, label: &str, start: Instant) {
        let failed = self.failures().count();
        if failed == 0 {
            log!(label; "{} file(s) written in {:.2?}", self.written(), start.elapsed());
        } else {
            log!(label; "{} file(s) written, {} task(s) failed, in {:.2?}",
                self.written(), failed, start.elapsed());
        }
    }
}
