//! `[styles]` section configuration.
//!
//! ```toml
//! [styles]
//! entry = "scss/main.scss"
//! watch = ["scss/**/*.scss"]
//! output = "css"                 # directory under the output root
//! suffix = ".min"                # main.scss -> main.min.css
//! load_paths = []                # extra Sass load paths (project-relative)
//! targets = ["chrome 87", "firefox 78", "safari 14"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Entry stylesheet, relative to the source root.
    pub entry: PathBuf,

    /// Globs whose changes rebuild styles.
    pub watch: Vec<String>,

    /// Output directory, relative to the output root.
    pub output: PathBuf,

    /// Inserted before the `.css` extension.
    pub suffix: String,

    pub load_paths: Vec<PathBuf>,

    /// Browser targets for vendor prefixing, `"<browser> <major>[.<minor>]"`.
    pub targets: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entry: "scss/main.scss".into(),
            watch: vec!["scss/**/*.scss".into()],
            output: "css".into(),
            suffix: ".min".into(),
            load_paths: Vec::new(),
            targets: vec![
                "chrome 87".into(),
                "edge 88".into(),
                "firefox 78".into(),
                "safari 14".into(),
                "ios_saf 14".into(),
            ],
        }
    }
}

impl StylesConfig {
    /// Output file name for the entry: `main.scss` -> `main.min.css`.
    pub fn output_name(&self) -> String {
        let stem = self
            .entry
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("main");
        format!("{stem}{}.css", self.suffix)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entry.as_os_str().is_empty() {
            diag.error(FieldPath::new("styles.entry"), "entry must not be empty");
        }
        for target in &self.targets {
            if let Err(e) = crate::minify::parse_target(target) {
                diag.error_with_hint(
                    FieldPath::new("styles.targets"),
                    e.to_string(),
                    "use `<browser> <version>`, e.g. \"chrome 87\"",
                );
            }
        }
    }
}
