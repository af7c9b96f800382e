//! Task Actor
//!
//! Runs the tasks of each watch batch on the blocking pool and reports the
//! batch on the watch status line.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::logger::{status_error, status_success};
use crate::reload::ReloadHandle;
use crate::task::{self, Failure, TaskContext, TaskName, TaskOutcome};

pub struct TaskActor {
    rx: mpsc::Receiver<TaskMsg>,
    config: Arc<PipelineConfig>,
    reload: ReloadHandle,
}

impl TaskActor {
    pub fn new(rx: mpsc::Receiver<TaskMsg>, config: Arc<PipelineConfig>, reload: ReloadHandle) -> Self {
        Self { rx, config, reload }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                TaskMsg::Run { tasks, paths } => self.run_batch(tasks, paths).await,
                TaskMsg::Shutdown => break,
            }
        }
        crate::debug!("task"; "stopped");
    }

    /// Tasks of one batch run concurrently; the status line waits for all.
    async fn run_batch(&self, tasks: Vec<TaskName>, paths: Vec<PathBuf>) {
        let start = Instant::now();

        let handles: Vec<_> = tasks
            .iter()
            .map(|&name| {
                let config = Arc::clone(&self.config);
                let reload = self.reload.clone();
                let handle = tokio::task::spawn_blocking(move || run_watched(name, &config, &reload));
                (name, handle)
            })
            .collect();

        let mut failures = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(TaskOutcome::Done { .. }) => {}
                Ok(TaskOutcome::Failed(failure)) => failures.push(format!("{name}: {failure}")),
                Err(e) => failures.push(format!("{name}: task panicked: {e}")),
            }
        }

        let names = tasks.iter().copied().map(TaskName::as_str).collect::<Vec<_>>().join(", ");
        if failures.is_empty() {
            status_success(&format!(
                "{names} ({} changed, {:.0?})",
                changed_summary(&paths),
                start.elapsed()
            ));
        } else {
            status_error(&format!("{names} failed"), &failures.join("\n"));
        }
    }
}

/// Run one task for a watch batch.
///
/// A hard error does not stop watching: it is reported like a soft failure
/// so the overlay shows it until the next successful run.
fn run_watched(name: TaskName, config: &PipelineConfig, reload: &ReloadHandle) -> TaskOutcome {
    let ctx = TaskContext::new(config, BuildMode::DEVELOPMENT).with_reload(reload);
    let result: Result<TaskOutcome> = task::run(name, &ctx);
    result.unwrap_or_else(|e| {
        let outcome = TaskOutcome::failed(Failure::new(format!("{e:#}")));
        if name.notifies_clients() {
            reload.notify(name, &outcome, config);
        }
        outcome
    })
}

fn changed_summary(paths: &[PathBuf]) -> String {
    match paths {
        [one] => one.display().to_string(),
        many => format!("{} files", many.len()),
    }
}
