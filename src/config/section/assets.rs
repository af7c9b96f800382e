//! `[resources]`, `[fonts]` and `[sprite]` section configuration.
//!
//! ```toml
//! [resources]
//! globs = ["resources/**"]   # copied to the output root
//! output = ""
//!
//! [fonts]
//! globs = ["fonts/*.{ttf,otf}"]
//! output = "fonts"
//! woff = true
//! woff2 = true
//!
//! [sprite]
//! globs = ["img/logo*.svg"]
//! watch = ["img/*.svg"]
//! output = "img/sprite.svg"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub globs: Vec<String>,
    pub output: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            globs: vec!["resources/**".into()],
            output: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    pub globs: Vec<String>,
    pub output: PathBuf,
    pub woff: bool,
    pub woff2: bool,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            globs: vec!["fonts/*.{ttf,otf}".into()],
            output: "fonts".into(),
            woff: true,
            woff2: true,
        }
    }
}

impl FontsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.woff && !self.woff2 {
            diag.error_with_hint(
                FieldPath::new("fonts"),
                "both `woff` and `woff2` are disabled",
                "remove the font globs instead to skip the task",
            );
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    pub globs: Vec<String>,
    pub watch: Vec<String>,
    /// Sprite file, relative to the output root.
    pub output: PathBuf,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            globs: vec!["img/logo*.svg".into()],
            watch: vec!["img/*.svg".into()],
            output: "img/sprite.svg".into(),
        }
    }
}

impl SpriteConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.output.extension().and_then(|e| e.to_str()) != Some("svg") {
            diag.error(FieldPath::new("sprite.output"), "sprite output must be an .svg file");
        }
    }
}
