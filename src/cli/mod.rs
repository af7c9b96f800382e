//! Command-line interface module.

mod args;
pub mod tasks;

pub use args::{Cli, Commands};
