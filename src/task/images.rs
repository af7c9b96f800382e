//! `webp` and `images-optimize`.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Failure, OutcomeBuilder, TaskContext, TaskOutcome};
use crate::image;
use crate::utils::fs::write_atomic;
use crate::utils::glob::{GlobMatch, GlobSet};

/// Convert matched raster images to the configured modern format.
pub fn convert(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let convert = &config.images.convert;
    let out_dir = config.output_join(&config.images.output);
    let ext = convert.format.extension();

    let matches = GlobSet::new(&convert.globs)?.walk(config.source_dir());
    process(&matches, |m, data| {
        let dest = out_dir.join(m.relative.with_extension(ext));
        let encoded = image::convert(data, convert.format, convert.quality)?;
        Ok((dest, encoded))
    })
}

/// Recompress images already copied by `images`, from their source bytes.
pub fn optimize(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let options = &config.images.optimize;
    let out_dir = config.output_join(&config.images.output);

    let matches = GlobSet::new(&options.globs)?.walk(config.source_dir());
    process(&matches, |m, data| {
        let dest = out_dir.join(&m.relative);
        let optimized = image::optimize(&m.path, data, options)?;
        Ok((dest, optimized))
    })
}

/// Run `encode` over every match in parallel.
///
/// Read and write errors abort; encode errors fail the single image.
fn process<F>(matches: &[GlobMatch], encode: F) -> Result<TaskOutcome>
where
    F: Fn(&GlobMatch, &[u8]) -> Result<(PathBuf, Vec<u8>)> + Sync,
{
    let results = matches
        .par_iter()
        .map(|m| {
            let data = fs::read(&m.path).with_context(|| format!("failed to read {}", m.path.display()))?;
            match encode(m, &data) {
                Ok((dest, bytes)) => {
                    write_atomic(&dest, bytes)?;
                    Ok(Ok(dest))
                }
                Err(e) => Ok(Err(failure(&m.path, &e))),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut builder = OutcomeBuilder::default();
    for result in results {
        match result {
            Ok(path) => builder.wrote(path),
            Err(failure) => builder.fail(failure),
        }
    }
    Ok(builder.finish())
}

fn failure(path: &Path, error: &anyhow::Error) -> Failure {
    Failure::at(path, format!("{error:#}"))
}
