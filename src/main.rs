//! assetflow - a static asset pipeline with a live-reload dev server.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod font;
mod image;
mod logger;
mod markup;
mod minify;
mod pipeline;
mod reload;
mod serve;
mod sprite;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;
use core::BuildMode;
use pipeline::Pipeline;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;

    match cli.command.clone().unwrap_or_default() {
        Commands::Dev { .. } => Pipeline::development().run(&config).map(|_| ()),
        Commands::Build => {
            let report = Pipeline::production().run(&config)?;
            if report.has_failures() {
                log!("build"; "finished with {} failed task(s)", report.failures().count());
            }
            Ok(())
        }
        Commands::Run { tasks, build } => {
            let mode = if build {
                BuildMode::PRODUCTION
            } else {
                BuildMode::DEVELOPMENT
            };
            Pipeline::standalone(&tasks, mode).run(&config).map(|_| ())
        }
        Commands::Tasks => cli::tasks::print_tasks(&config),
    }
}
