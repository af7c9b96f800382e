//! `[images]` section configuration.
//!
//! ```toml
//! [images]
//! globs = ["img/*.{jpg,png,svg}"]
//! output = "img"
//!
//! [images.convert]
//! globs = ["img/*.{jpg,png}", "!img/css-*.{jpg,png}"]
//! watch = ["img/*.{jpg,png}"]
//! format = "webp"       # "webp" or "avif"
//! quality = 90          # 1..=100
//!
//! [images.optimize]     # production pipeline only
//! globs = ["img/*.{jpg,png,svg}"]
//! png_level = 3         # 0..=7, 3 and above use the best compression
//! jpeg_quality = 75
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub globs: Vec<String>,
    /// Defaults to `globs` when empty.
    pub watch: Vec<String>,
    /// Output directory, relative to the output root.
    pub output: PathBuf,
    pub convert: ConvertConfig,
    pub optimize: OptimizeConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            globs: vec!["img/*.{jpg,png,svg}".into()],
            watch: Vec::new(),
            output: "img".into(),
            convert: ConvertConfig::default(),
            optimize: OptimizeConfig::default(),
        }
    }
}

/// Modern image format produced by the `webp` task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Avif,
}

impl ImageFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub globs: Vec<String>,
    pub watch: Vec<String>,
    pub format: ImageFormat,
    pub quality: u8,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            globs: vec!["img/*.{jpg,png}".into(), "!img/css-*.{jpg,png}".into()],
            watch: vec!["img/*.{jpg,png}".into()],
            format: ImageFormat::Webp,
            quality: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    pub globs: Vec<String>,
    pub png_level: u8,
    pub jpeg_quality: u8,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            globs: vec!["img/*.{jpg,png,svg}".into()],
            png_level: 3,
            jpeg_quality: 75,
        }
    }
}

impl ImagesConfig {
    pub fn watch_globs(&self) -> &[String] {
        if self.watch.is_empty() {
            &self.globs
        } else {
            &self.watch
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        diag.check_range(
            FieldPath::new("images.convert.quality"),
            self.convert.quality,
            1..=100,
        );
        diag.check_range(
            FieldPath::new("images.optimize.jpeg_quality"),
            self.optimize.jpeg_quality,
            1..=100,
        );
        diag.check_range(
            FieldPath::new("images.optimize.png_level"),
            self.optimize.png_level,
            0..=7,
        );
    }
}
