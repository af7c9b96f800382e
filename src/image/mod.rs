//! Image encoding.
//!
//! # Modules
//!
//! - [`convert`]: raster images to lossy WebP or AVIF
//! - [`optimize`]: recompression of PNG, JPEG (progressive) and SVG

pub mod convert;
pub mod optimize;

pub use convert::convert;
pub use optimize::optimize;
