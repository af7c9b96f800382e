use std::path::{Path, PathBuf};
use thiserror::Error;

use super::MAX_DEPTH;

/// An include that could not be expanded.
///
/// `file` is the document containing the offending directive, except for
/// [`IncludeError::Read`] where it is the file that could not be read.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("line {line}: fragment `{include}` not found")]
    Missing {
        file: PathBuf,
        line: usize,
        include: String,
    },

    #[error("line {line}: include cycle {chain}")]
    Cycle {
        file: PathBuf,
        line: usize,
        chain: String,
    },

    #[error("line {line}: includes nested deeper than {MAX_DEPTH} levels")]
    TooDeep { file: PathBuf, line: usize },

    #[error("line {line}: malformed include: {reason}")]
    Malformed {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// Filesystem error, not a content error.
    #[error("failed to read {}: {source}", file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IncludeError {
    pub fn file(&self) -> &Path {
        match self {
            Self::Missing { file, .. }
            | Self::Cycle { file, .. }
            | Self::TooDeep { file, .. }
            | Self::Malformed { file, .. }
            | Self::Read { file, .. } => file,
        }
    }
}
