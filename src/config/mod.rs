//! Pipeline configuration from `assetflow.toml`.
//!
//! ```text
//! config/
//! ├── section/   # one module per TOML section
//! ├── types/     # ConfigError, diagnostics, FieldPath
//! ├── util.rs    # config file discovery
//! └── mod.rs     # PipelineConfig (this file)
//! ```
//!
//! The file is optional: without one, every section takes its default and
//! the current directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BasePath, ConvertConfig, FontsConfig, ImageFormat, ImagesConfig, MarkupConfig, OptimizeConfig,
    PathsConfig, ResourcesConfig, ScriptsConfig, ServeConfig, SpriteConfig, StylesConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    debug, log,
    utils::{glob::GlobSet, path::normalize_path},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing `assetflow.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Absolute path of the loaded config file, if any
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root: the config file's directory, or cwd
    #[serde(skip)]
    pub root: PathBuf,

    pub paths: PathsConfig,
    pub styles: StylesConfig,
    pub markup: MarkupConfig,
    pub images: ImagesConfig,
    pub resources: ResourcesConfig,
    pub fonts: FontsConfig,
    pub scripts: ScriptsConfig,
    pub sprite: SpriteConfig,
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file, applies CLI overrides,
    /// normalizes paths and validates.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.finalize()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Toml)?)
    }

    /// Load configuration from a file, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Build a config rooted at `root` with default sections.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Result<Self> {
        let mut config = Self {
            root: root.to_path_buf(),
            ..Self::default()
        };
        config.finalize()?;
        Ok(config)
    }

    // ========================================================================
    // accessors
    // ========================================================================

    pub fn source_dir(&self) -> &Path {
        &self.paths.source
    }

    pub fn output_dir(&self) -> &Path {
        &self.paths.output
    }

    pub fn source_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.paths.source.join(path)
    }

    pub fn output_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.paths.output.join(path)
    }

    /// Path relative to the source root, for display.
    pub fn source_relative(&self, path: &Path) -> String {
        crate::utils::fs::display_relative(path, &self.paths.source)
    }

    /// Path relative to the output root, for display.
    #[cfg(test)]
    pub fn output_relative(&self, path: &Path) -> String {
        crate::utils::fs::display_relative(path, &self.paths.output)
    }

    // ========================================================================
    // cli overrides
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.paths.source, cli.source.as_ref());
        Self::update_option(&mut self.paths.output, cli.output.as_ref());

        if let Some(Commands::Dev { interface, port }) = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // normalization & validation
    // ========================================================================

    fn finalize(&mut self) -> Result<()> {
        self.normalize_paths();
        self.validate()
    }

    /// Make all filesystem paths absolute. Globs stay source-relative.
    fn normalize_paths(&mut self) {
        let root = normalize_path(&self.root);
        self.root = root.clone();

        self.paths.source = normalize_path(&root.join(&self.paths.source));
        self.paths.output = normalize_path(&root.join(&self.paths.output));

        self.styles.load_paths = self
            .styles
            .load_paths
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();

        if let BasePath::Dir(dir) = &self.markup.basepath {
            self.markup.basepath = BasePath::Dir(normalize_path(&root.join(dir)));
        }
    }

    /// Collect every validation error and report them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&self.root, &mut diag);
        self.styles.validate(&mut diag);
        self.markup.validate(&mut diag);
        self.images.validate(&mut diag);
        self.fonts.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.sprite.validate(&mut diag);
        self.validate_globs(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_globs(&self, diag: &mut ConfigDiagnostics) {
        let lists: [(&'static str, &[String]); 12] = [
            ("styles.watch", self.styles.watch.as_slice()),
            ("markup.watch", self.markup.watch.as_slice()),
            ("images.globs", self.images.globs.as_slice()),
            ("images.watch", self.images.watch.as_slice()),
            ("images.convert.globs", self.images.convert.globs.as_slice()),
            ("images.convert.watch", self.images.convert.watch.as_slice()),
            ("images.optimize.globs", self.images.optimize.globs.as_slice()),
            ("resources.globs", self.resources.globs.as_slice()),
            ("fonts.globs", self.fonts.globs.as_slice()),
            ("sprite.globs", self.sprite.globs.as_slice()),
            ("sprite.watch", self.sprite.watch.as_slice()),
            ("scripts.watch", self.scripts.watch.as_slice()),
        ];
        for (field, globs) in lists {
            if let Err(e) = GlobSet::new(globs) {
                diag.error(FieldPath::new(field), format!("{e:#}"));
            }
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse a config snippet. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted in a temp project directory.
#[cfg(test)]
pub fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig::for_root(root).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(PipelineConfig::from_str("[paths\nsource = \"src\"").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nsource = \"src\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_for_root_normalizes_paths() {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        assert!(config.source_dir().is_absolute());
        assert!(config.source_dir().ends_with("src"));
        assert!(config.output_dir().ends_with("app"));
        assert_eq!(
            config.source_relative(&config.source_join("scss/main.scss")),
            "scss/main.scss"
        );
    }

    #[test]
    fn test_same_source_and_output_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[paths]\nsource = \"web\"\noutput = \"web\"");
        config.root = temp.path().to_path_buf();
        let err = config.finalize().unwrap_err();
        assert!(err.to_string().contains("paths.output"));
    }

    #[test]
    fn test_output_at_root_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[paths]\noutput = \".\"");
        config.root = temp.path().to_path_buf();
        assert!(config.finalize().is_err());
    }

    #[test]
    fn test_cli_overrides_paths_and_port() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "assetflow", "-s", "assets", "-o", "dist", "dev", "--port", "4000",
        ])
        .unwrap();

        let mut config = PipelineConfig::default();
        config.apply_cli(&cli);
        assert_eq!(config.paths.source, PathBuf::from("assets"));
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.serve.port, 4000);
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[resources]\nglobs = [\"resources/[a-\"]");
        config.root = temp.path().to_path_buf();
        let err = config.finalize().unwrap_err();
        assert!(err.to_string().contains("resources.globs"));
    }

    #[test]
    fn test_basepath_dir_normalized() {
        let temp = TempDir::new().unwrap();
        let mut config = test_parse_config("[markup]\nbasepath = \"src/partials\"");
        config.root = temp.path().to_path_buf();
        config.finalize().unwrap();
        match &config.markup.basepath {
            BasePath::Dir(dir) => assert!(dir.is_absolute() && dir.ends_with("src/partials")),
            other => panic!("unexpected basepath: {other:?}"),
        }
    }
}
