//! `markup`: expand includes in every entry page.

use anyhow::{Context, Result, bail};

use super::{Failure, OutcomeBuilder, TaskContext, TaskOutcome};
use crate::markup::{IncludeError, Includer};
use crate::utils::fs::write_atomic;

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let includer = Includer::new(&config.markup, config.source_dir())?;

    let mut builder = OutcomeBuilder::default();
    for entry in &config.markup.entries {
        let page = config.source_join(entry);
        if !page.is_file() {
            bail!("markup entry not found: {}", page.display());
        }

        match includer.expand_file(&page) {
            Ok(html) => {
                let dest = config.output_join(entry);
                write_atomic(&dest, html)?;
                builder.wrote(dest);
            }
            Err(e @ IncludeError::Read { .. }) => {
                return Err(e).with_context(|| format!("failed to expand {}", page.display()));
            }
            Err(e) => builder.fail(Failure::at(e.file(), e.to_string())),
        }
    }
    Ok(builder.finish())
}
