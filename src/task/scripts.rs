//! `scripts`: bundle the entry with an external bundler, then minify.
//!
//! The bundler receives the entry path as its last argument and prints the
//! bundle to stdout. With an empty `bundler` list the entry is minified as is.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use super::{Failure, TaskContext, TaskOutcome};
use crate::config::PipelineConfig;
use crate::minify::minify_js;
use crate::utils::exec::{Cmd, FilterRule};
use crate::utils::fs::write_atomic;

static BUNDLER_FILTER: FilterRule = FilterRule::new(&["▲ [WARNING]"]);

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let scripts = &config.scripts;

    let entry = config.source_join(&scripts.entry);
    if !entry.is_file() {
        bail!("scripts entry not found: {}", entry.display());
    }

    let bundle = match bundle(config, &entry)? {
        Ok(code) => code,
        Err(failure) => return Ok(TaskOutcome::failed(failure)),
    };

    let filename = config.source_relative(&entry);
    let minified = match minify_js(&bundle, &filename, ctx.mode.source_maps) {
        Ok(minified) => minified,
        Err(e) => return Ok(TaskOutcome::failed(Failure::at(&entry, e.to_string()))),
    };

    let js_path = config.output_join(&scripts.output);
    let map_name = format!(
        "{}.map",
        js_path.file_name().and_then(|n| n.to_str()).unwrap_or("main.js")
    );

    write_atomic(&js_path, minified.code_with_map_url(&map_name, false))?;
    let mut written = vec![js_path.clone()];

    if let Some(map) = &minified.map {
        let map_path = js_path.with_file_name(&map_name);
        write_atomic(&map_path, map)?;
        written.push(map_path);
    }

    Ok(TaskOutcome::done(written))
}

/// Outer error: the entry could not be read. Inner error: the bundler failed.
fn bundle(config: &PipelineConfig, entry: &Path) -> Result<Result<String, Failure>> {
    let Some(program) = config.scripts.bundler.first() else {
        let code = fs::read_to_string(entry)
            .with_context(|| format!("failed to read {}", entry.display()))?;
        return Ok(Ok(code));
    };

    if which::which(program).is_err() {
        return Ok(Err(Failure::at(
            entry,
            format!("bundler `{program}` not found in PATH"),
        )));
    }

    let output = Cmd::from_slice(&config.scripts.bundler)
        .arg(entry)
        .cwd(config.source_dir())
        .filter(&BUNDLER_FILTER)
        .run();

    Ok(match output {
        Ok(output) => match String::from_utf8(output.stdout) {
            Ok(code) => Ok(code),
            Err(_) => Err(Failure::at(entry, "bundler produced invalid UTF-8")),
        },
        Err(e) => Err(Failure::at(entry, format!("{e:#}"))),
    })
}
