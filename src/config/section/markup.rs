//! `[markup]` section configuration.
//!
//! ```toml
//! [markup]
//! entries = ["index.html"]
//! watch = ["*.html", "html/**/*.html"]
//! prefix = "@"          # @include('...') and @name variables
//! basepath = "@file"    # "@file", "@root" or a project-relative directory
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Where include paths are resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BasePath {
    /// Directory of the including file.
    File,
    /// Source root.
    Root,
    /// Fixed directory (absolute after normalization).
    Dir(PathBuf),
}

impl From<String> for BasePath {
    fn from(s: String) -> Self {
        match s.as_str() {
            "@file" => Self::File,
            "@root" => Self::Root,
            _ => Self::Dir(PathBuf::from(s)),
        }
    }
}

impl From<BasePath> for String {
    fn from(b: BasePath) -> Self {
        match b {
            BasePath::File => "@file".into(),
            BasePath::Root => "@root".into(),
            BasePath::Dir(p) => p.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Pages to expand, relative to the source root.
    pub entries: Vec<PathBuf>,
    pub watch: Vec<String>,
    pub prefix: String,
    pub basepath: BasePath,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            entries: vec!["index.html".into()],
            watch: vec!["*.html".into(), "html/**/*.html".into()],
            prefix: "@".into(),
            basepath: BasePath::File,
        }
    }
}

impl MarkupConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entries.is_empty() || self.entries.iter().any(|e| e.as_os_str().is_empty()) {
            diag.error(FieldPath::new("markup.entries"), "entries must be non-empty paths");
        }
        if self.prefix.is_empty() || self.prefix.chars().any(char::is_whitespace) {
            diag.error(
                FieldPath::new("markup.prefix"),
                "prefix must be non-empty and contain no whitespace",
            );
        }
    }
}
