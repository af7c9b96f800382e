//! `assetflow tasks`: list tasks, pipelines and watch bindings.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use crate::task::TaskName;
use crate::watch::WatchSet;

pub fn print_tasks(config: &PipelineConfig) -> Result<()> {
    let watch_set = WatchSet::from_config(config)?;

    println!("{}", "Tasks".bold());
    let width = TaskName::ALL.iter().map(|t| t.as_str().len()).max().unwrap_or(0);
    for task in TaskName::ALL {
        println!("  {:<width$}  {}", task.as_str().cyan(), task.description());
    }

    println!("\n{}", "Pipelines".bold());
    for pipeline in [Pipeline::development(), Pipeline::production()] {
        println!("  {:<6} {}", pipeline.name.cyan(), pipeline.describe());
    }

    println!("\n{} ({})", "Watch".bold(), config.source_dir().display());
    for binding in watch_set.bindings() {
        let notify = if binding.task.notifies_clients() { "" } else { "  (no reload)" };
        println!("  {:<24} -> {}{}", binding.glob, binding.task, notify.dimmed());
    }
    Ok(())
}
