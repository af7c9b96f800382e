//! `fonts`: TTF/OTF -> WOFF and WOFF2.
//!
//! The two passes run side by side; each converts every font in parallel.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Failure, OutcomeBuilder, TaskContext, TaskOutcome};
use crate::font::{FontError, to_woff, to_woff2};
use crate::utils::fs::write_atomic;
use crate::utils::glob::{GlobMatch, GlobSet};

type Encoder = fn(&[u8]) -> Result<Vec<u8>, FontError>;

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let fonts = &config.fonts;
    let out_dir = config.output_join(&fonts.output);
    let matches = GlobSet::new(&fonts.globs)?.walk(config.source_dir());

    let pass = |enabled: bool, ext: &'static str, encode: Encoder| {
        if enabled {
            convert_all(&matches, &out_dir, ext, encode)
        } else {
            Ok(Vec::new())
        }
    };
    let (woff, woff2) = rayon::join(
        || pass(fonts.woff, "woff", to_woff),
        || pass(fonts.woff2, "woff2", to_woff2),
    );

    let mut builder = OutcomeBuilder::default();
    for result in woff?.into_iter().chain(woff2?) {
        match result {
            Ok(path) => builder.wrote(path),
            Err(failure) => builder.fail(failure),
        }
    }
    Ok(builder.finish())
}

fn convert_all(
    matches: &[GlobMatch],
    out_dir: &Path,
    ext: &str,
    encode: Encoder,
) -> Result<Vec<Result<PathBuf, Failure>>> {
    matches
        .par_iter()
        .map(|m| {
            let data = fs::read(&m.path).with_context(|| format!("failed to read {}", m.path.display()))?;
            match encode(&data) {
                Ok(bytes) => {
                    let dest = out_dir.join(m.relative.with_extension(ext));
                    write_atomic(&dest, bytes)?;
                    Ok(Ok(dest))
                }
                Err(e) => Ok(Err(Failure::at(&m.path, format!("{ext}: {e}")))),
            }
        })
        .collect()
}
