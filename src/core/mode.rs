//! Development/production variants of every task.

/// Build mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Emit source maps next to compiled styles and scripts.
    pub source_maps: bool,

    /// Run the production-only stages (image optimization).
    pub optimize: bool,
}

impl BuildMode {
    /// Production mode: no source maps, optimized images.
    pub const PRODUCTION: Self = Self {
        source_maps: false,
        optimize: true,
    };

    /// Development mode: source maps, no image optimization.
    pub const DEVELOPMENT: Self = Self {
        source_maps: true,
        optimize: false,
    };

    #[inline]
    pub const fn is_dev(&self) -> bool {
        self.source_maps
    }

    pub const fn name(&self) -> &'static str {
        if self.is_dev() { "development" } else { "production" }
    }
}
