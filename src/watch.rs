//! Watch bindings: which task runs when a source file changes.
//!
//! Every positive watch glob becomes one binding. Exclusions (`!glob`) apply
//! to the bindings of the list they were written in.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::PipelineConfig;
use crate::task::TaskName;
use crate::utils::glob::GlobSet;

/// One `glob -> task` binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub task: TaskName,
    /// The positive glob as written.
    pub glob: String,
    set: GlobSet,
}

impl Binding {
    pub fn matches(&self, relative: &Path) -> bool {
        self.set.is_match(relative)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    bindings: Vec<Binding>,
}

impl WatchSet {
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let lists: [(TaskName, &[String]); 8] = [
            (TaskName::Styles, config.styles.watch.as_slice()),
            (TaskName::Markup, config.markup.watch.as_slice()),
            (TaskName::Images, config.images.watch_globs()),
            (TaskName::Webp, config.images.convert.watch.as_slice()),
            (TaskName::Sprite, config.sprite.watch.as_slice()),
            (TaskName::Resources, config.resources.globs.as_slice()),
            (TaskName::Fonts, config.fonts.globs.as_slice()),
            (TaskName::Scripts, config.scripts.watch.as_slice()),
        ];

        let mut set = Self::default();
        for (task, globs) in lists {
            set.bind(task, globs)
                .with_context(|| format!("invalid watch glob for `{task}`"))?;
        }
        Ok(set)
    }

    fn bind(&mut self, task: TaskName, globs: &[String]) -> Result<()> {
        let (excludes, includes): (Vec<&String>, Vec<&String>) =
            globs.iter().partition(|g| g.trim_start().starts_with('!'));

        for glob in includes {
            let patterns: Vec<&str> = std::iter::once(glob.as_str())
                .chain(excludes.iter().map(|e| e.as_str()))
                .collect();
            self.bindings.push(Binding {
                task,
                glob: glob.clone(),
                set: GlobSet::new(&patterns)?,
            });
        }
        Ok(())
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Tasks bound to any of the changed (source-relative) paths.
    ///
    /// Each task appears once, in binding order.
    pub fn tasks_for<'p>(&self, paths: impl IntoIterator<Item = &'p Path>) -> Vec<TaskName> {
        let paths: Vec<&Path> = paths.into_iter().collect();
        let mut tasks = Vec::new();
        for binding in &self.bindings {
            if !tasks.contains(&binding.task) && paths.iter().any(|p| binding.matches(p)) {
                tasks.push(binding.task);
            }
        }
        tasks
    }
}
