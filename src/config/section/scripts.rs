//! `[scripts]` section configuration.
//!
//! ```toml
//! [scripts]
//! entry = "js/main.js"
//! watch = ["js/**/*.js"]
//! output = "js/main.js"
//! # Bundler command; the entry path is appended and the bundle read from stdout.
//! # An empty list skips bundling.
//! bundler = ["esbuild", "--bundle", "--target=es2015", "--format=iife"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub entry: PathBuf,
    pub watch: Vec<String>,
    /// Bundle path, relative to the output root.
    pub output: PathBuf,
    pub bundler: Vec<String>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            entry: "js/main.js".into(),
            watch: vec!["js/**/*.js".into()],
            output: "js/main.js".into(),
            bundler: vec![
                "esbuild".into(),
                "--bundle".into(),
                "--target=es2015".into(),
                "--format=iife".into(),
            ],
        }
    }
}

impl ScriptsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entry.as_os_str().is_empty() {
            diag.error(FieldPath::new("scripts.entry"), "entry must not be empty");
        }
        if self.output.as_os_str().is_empty() {
            diag.error(FieldPath::new("scripts.output"), "output must not be empty");
        }
        if self.bundler.first().is_some_and(|p| p.trim().is_empty()) {
            diag.error(FieldPath::new("scripts.bundler"), "bundler program is empty");
        }
    }
}
