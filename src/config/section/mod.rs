//! Configuration section definitions.
//!
//! | Module    | TOML Section                       |
//! |-----------|------------------------------------|
//! | `paths`   | `[paths]`                          |
//! | `styles`  | `[styles]`                         |
//! | `markup`  | `[markup]`                         |
//! | `images`  | `[images]`, `[images.convert]`, `[images.optimize]` |
//! | `assets`  | `[resources]`, `[fonts]`, `[sprite]` |
//! | `scripts` | `[scripts]`                        |
//! | `serve`   | `[serve]`                          |

mod assets;
mod images;
mod markup;
mod paths;
mod scripts;
mod serve;
mod styles;

pub use assets::{FontsConfig, ResourcesConfig, SpriteConfig};
pub use images::{ConvertConfig, ImageFormat, ImagesConfig, OptimizeConfig};
pub use markup::{BasePath, MarkupConfig};
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::StylesConfig;
