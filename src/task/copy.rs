//! `images` and `resources`: copy matched files into the output tree.

use anyhow::Result;
use rayon::prelude::*;
use std::path::Path;

use super::{TaskContext, TaskOutcome};
use crate::utils::fs::copy_atomic;
use crate::utils::glob::GlobSet;

pub fn images(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    copy_matches(&config.images.globs, config.source_dir(), &config.output_join(&config.images.output))
}

/// Resources land at the output root unless `resources.output` says otherwise.
pub fn resources(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    copy_matches(
        &config.resources.globs,
        config.source_dir(),
        &config.output_join(&config.resources.output),
    )
}

fn copy_matches(globs: &[String], source: &Path, target: &Path) -> Result<TaskOutcome> {
    let matches = GlobSet::new(globs)?.walk(source);

    let written = matches
        .par_iter()
        .map(|m| {
            let dest = target.join(&m.relative);
            copy_atomic(&m.path, &dest)?;
            Ok(dest)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TaskOutcome::done(written))
}
