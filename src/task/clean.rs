//! `clean`: empty the output tree.

use anyhow::Result;

use super::{TaskContext, TaskOutcome};
use crate::debug;
use crate::utils::fs::clear_dir;

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let output = ctx.config.output_dir();
    let removed = clear_dir(output)?;
    debug!("clean"; "removed {removed} entries from {}", output.display());
    Ok(TaskOutcome::done(Vec::new()))
}
