//! Shared helpers.

pub mod exec;
pub mod fs;
pub mod glob;
pub mod mime;
pub mod path;
