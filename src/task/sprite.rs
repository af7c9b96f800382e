//! `sprite`: assemble matched icons into one stack sprite.

use anyhow::{Context, Result};
use std::fs;

use super::{Failure, TaskContext, TaskOutcome};
use crate::sprite::SpriteBuilder;
use crate::utils::fs::write_atomic;
use crate::utils::glob::GlobSet;

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let mut matches = GlobSet::new(&config.sprite.globs)?.walk(config.source_dir());
    if matches.is_empty() {
        return Ok(TaskOutcome::done(Vec::new()));
    }
    matches.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    let mut sprite = SpriteBuilder::new()?;
    for m in &matches {
        let data = fs::read(&m.path).with_context(|| format!("failed to read {}", m.path.display()))?;
        let id = m
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if let Err(e) = sprite.add(id, &data) {
            return Ok(TaskOutcome::failed(Failure::at(&m.path, format!("{e:#}"))));
        }
    }

    let dest = config.output_join(&config.sprite.output);
    write_atomic(&dest, sprite.finish()?)?;
    Ok(TaskOutcome::done(vec![dest]))
}
