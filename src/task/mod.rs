//! Named pipeline tasks.
//!
//! Every task reads from the source tree, writes into the output tree and
//! reports a [`TaskOutcome`]:
//!
//! - `Ok(Done)`: outputs written
//! - `Ok(Failed)`: a transformation error (bad Sass, missing fragment, ...);
//!   logged, shown to live-reload clients, the pipeline keeps going
//! - `Err`: a filesystem error; the pipeline aborts once the running stage joins

mod clean;
mod copy;
mod fonts;
mod images;
mod markup;
mod scripts;
mod sprite;
mod styles;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::reload::ReloadHandle;
use crate::{debug, log};

/// Task identifiers, as accepted by `assetflow run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum TaskName {
    /// Empty the output directory
    Clean,
    /// Compile, prefix and minify the Sass entry
    Styles,
    /// Expand HTML includes
    #[value(alias = "fileinclude")]
    Markup,
    /// Copy images
    Images,
    /// Convert raster images to WebP/AVIF
    Webp,
    /// Recompress copied images (production)
    ImagesOptimize,
    /// Copy static resources to the output root
    Resources,
    /// Convert TTF/OTF fonts to WOFF and WOFF2
    Fonts,
    /// Bundle and minify scripts
    Scripts,
    /// Assemble the SVG sprite
    Sprite,
}

impl TaskName {
    pub const ALL: [Self; 10] = [
        Self::Clean,
        Self::Styles,
        Self::Markup,
        Self::Images,
        Self::Webp,
        Self::ImagesOptimize,
        Self::Resources,
        Self::Fonts,
        Self::Scripts,
        Self::Sprite,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Styles => "styles",
            Self::Markup => "markup",
            Self::Images => "images",
            Self::Webp => "webp",
            Self::ImagesOptimize => "images-optimize",
            Self::Resources => "resources",
            Self::Fonts => "fonts",
            Self::Scripts => "scripts",
            Self::Sprite => "sprite",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Clean => "empty the output directory",
            Self::Styles => "compile Sass, add vendor prefixes, minify",
            Self::Markup => "expand @include directives in HTML",
            Self::Images => "copy images",
            Self::Webp => "convert raster images to WebP/AVIF",
            Self::ImagesOptimize => "recompress images (production only)",
            Self::Resources => "copy static resources to the output root",
            Self::Fonts => "convert fonts to WOFF and WOFF2",
            Self::Scripts => "bundle and minify scripts",
            Self::Sprite => "assemble SVG icons into a sprite",
        }
    }

    /// Whether live-reload clients hear about this task's results.
    pub const fn notifies_clients(self) -> bool {
        matches!(self, Self::Styles | Self::Markup | Self::Scripts)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transformation error: the task ran, but produced no (or partial) output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Source file the error points at, if any
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }

    pub fn at(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Done { written: Vec<PathBuf> },
    Failed(Failure),
}

impl TaskOutcome {
    pub fn done(written: Vec<PathBuf>) -> Self {
        Self::Done { written }
    }

    pub fn failed(failure: Failure) -> Self {
        Self::Failed(failure)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn written(&self) -> &[PathBuf] {
        match self {
            Self::Done { written } => written,
            Self::Failed(_) => &[],
        }
    }
}

/// Collects per-file results of a multi-file task.
///
/// One bad input fails the task, but every other input is still written.
#[derive(Debug, Default)]
pub struct OutcomeBuilder {
    written: Vec<PathBuf>,
    failures: Vec<Failure>,
}

impl OutcomeBuilder {
    pub fn wrote(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub fn fail(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    pub fn finish(mut self) -> TaskOutcome {
        if self.failures.is_empty() {
            self.written.sort();
            return TaskOutcome::done(self.written);
        }
        let path = self.failures[0].path.clone();
        let message = self
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        TaskOutcome::failed(Failure { path, message })
    }
}

/// Everything a task needs to run.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub config: &'a PipelineConfig,
    pub mode: BuildMode,
    /// Live-reload sink, present while watching
    pub reload: Option<&'a ReloadHandle>,
}

impl<'a> TaskContext<'a> {
    pub fn new(config: &'a PipelineConfig, mode: BuildMode) -> Self {
        Self {
            config,
            mode,
            reload: None,
        }
    }

    pub fn with_reload(mut self, reload: &'a ReloadHandle) -> Self {
        self.reload = Some(reload);
        self
    }
}

/// Run one task, log its outcome and notify live-reload clients.
pub fn run(name: TaskName, ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let start = Instant::now();

    let outcome = match name {
        TaskName::Clean => clean::run(ctx),
        TaskName::Styles => styles::run(ctx),
        TaskName::Markup => markup::run(ctx),
        TaskName::Images => copy::images(ctx),
        TaskName::Webp => images::convert(ctx),
        TaskName::ImagesOptimize => images::optimize(ctx),
        TaskName::Resources => copy::resources(ctx),
        TaskName::Fonts => fonts::run(ctx),
        TaskName::Scripts => scripts::run(ctx),
        TaskName::Sprite => sprite::run(ctx),
    }
    .with_context(|| format!("task `{name}` failed"))?;

    match &outcome {
        TaskOutcome::Done { written } => {
            debug!(name.as_str(); "{} file(s) in {:.0?}", written.len(), start.elapsed());
        }
        TaskOutcome::Failed(failure) => match &failure.path {
            Some(path) => {
                let path = ctx.config.source_relative(path);
                log!("error"; "{name}: {path}: {}", failure.message);
            }
            None => log!("error"; "{name}: {}", failure.message),
        },
    }

    if name.notifies_clients()
        && let Some(reload) = ctx.reload
    {
        reload.notify(name, &outcome, ctx.config);
    }

    Ok(outcome)
}
