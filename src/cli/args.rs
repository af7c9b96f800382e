//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::task::TaskName;

/// assetflow static asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (searched upward from the current directory)
    #[arg(short = 'C', long, global = true, default_value = "assetflow.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the development pipeline, then serve with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the production pipeline
    #[command(visible_alias = "b")]
    Build,

    /// Run individual tasks in the given order
    #[command(visible_alias = "r")]
    Run {
        /// Task names (e.g. `styles`, `markup`, `fileinclude`)
        #[arg(required = true, value_enum)]
        tasks: Vec<TaskName>,

        /// Use the production variant of each task
        #[arg(short, long)]
        build: bool,
    },

    /// List tasks, pipelines and watch bindings
    #[command(visible_alias = "t")]
    Tasks,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Dev {
            interface: None,
            port: None,
        }
    }
}
