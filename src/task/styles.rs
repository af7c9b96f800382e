//! `styles`: Sass entry -> prefixed, minified CSS.
//!
//! Development builds also write `<name>.map` next to the stylesheet. The map
//! describes the compiled CSS, since grass does not emit Sass source maps.

use anyhow::{Result, bail};

use super::{Failure, TaskContext, TaskOutcome};
use crate::minify::{minify_css, targets_from};
use crate::utils::fs::write_atomic;

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskOutcome> {
    let config = ctx.config;
    let styles = &config.styles;

    let entry = config.source_join(&styles.entry);
    if !entry.is_file() {
        bail!("styles entry not found: {}", entry.display());
    }

    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }
    for path in &styles.load_paths {
        options = options.load_path(path);
    }

    let css = match grass::from_path(&entry, &options) {
        Ok(css) => css,
        Err(e) => return Ok(TaskOutcome::failed(Failure::at(&entry, e.to_string()))),
    };

    let name = styles.output_name();
    let targets = targets_from(&styles.targets)?;
    let minified = match minify_css(&css, &config.source_relative(&entry), targets, ctx.mode.source_maps) {
        Ok(minified) => minified,
        Err(e) => return Ok(TaskOutcome::failed(Failure::at(&entry, e.to_string()))),
    };

    let out_dir = config.output_join(&styles.output);
    let css_path = out_dir.join(&name);
    let map_name = format!("{name}.map");

    write_atomic(&css_path, minified.code_with_map_url(&map_name, true))?;
    let mut written = vec![css_path];

    if let Some(map) = &minified.map {
        let map_path = out_dir.join(&map_name);
        write_atomic(&map_path, map)?;
        written.push(map_path);
    }

    Ok(TaskOutcome::done(written))
}
