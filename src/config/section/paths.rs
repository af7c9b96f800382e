//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! source = "src"   # SourceTree, read-only
//! output = "app"   # OutputTree, emptied by `clean`
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "app".into(),
        }
    }
}

impl PathsConfig {
    /// Run after normalization (both paths absolute).
    pub fn validate(&self, root: &std::path::Path, diag: &mut ConfigDiagnostics) {
        let field = FieldPath::new("paths.output");
        if self.source == self.output {
            diag.error(field, "output directory must differ from the source directory");
        } else if self.source.starts_with(&self.output) {
            diag.error_with_hint(
                field,
                "source directory lies inside the output directory",
                "`clean` empties the output directory before every run",
            );
        } else if self.output == root {
            diag.error(field, "output directory must not be the project root");
        }
    }
}
