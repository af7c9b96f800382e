//! Image recompression for production builds.
//!
//! The result is never larger than the input: when re-encoding does not help,
//! the original bytes are returned.

use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

use crate::config::OptimizeConfig;

/// Recompress `data` according to the extension of `path`.
///
/// Unknown extensions pass through untouched.
pub fn optimize(path: &Path, data: &[u8], options: &OptimizeConfig) -> Result<Vec<u8>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let optimized = match ext.as_str() {
        "png" => optimize_png(data, options.png_level)?,
        "jpg" | "jpeg" => optimize_jpeg(data, options.jpeg_quality)?,
        "svg" => optimize_svg(data)?,
        _ => return Ok(data.to_vec()),
    };

    Ok(if optimized.len() < data.len() {
        optimized
    } else {
        data.to_vec()
    })
}

fn optimize_png(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .context("failed to decode PNG")?;

    let compression = match level {
        0 => CompressionType::Fast,
        1 | 2 => CompressionType::Default,
        _ => CompressionType::Best,
    };

    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive)
        .write_image(
            img.as_bytes(),
            img.width(),
            img.height(),
            ExtendedColorType::from(img.color()),
        )
        .context("failed to encode PNG")?;
    Ok(buf)
}

/// Progressive JPEG at `quality`.
fn optimize_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .context("failed to decode JPEG")?;
    let rgb = img.to_rgb8();
    let width = u16::try_from(rgb.width()).context("JPEG wider than 65535 pixels")?;
    let height = u16::try_from(rgb.height()).context("JPEG taller than 65535 pixels")?;

    let mut buf = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buf, quality);
    encoder.set_progressive(true);
    encoder
        .encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .context("failed to encode JPEG")?;
    Ok(buf)
}

fn optimize_svg(data: &[u8]) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default()).context("failed to parse SVG")?;
    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&write_options).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fixtures::encoded;

    #[test]
    fn test_png_never_grows() {
        let png = encoded(image::ImageFormat::Png);
        let out = optimize(Path::new("a.png"), &png, &OptimizeConfig::default()).unwrap();
        assert!(out.len() <= png.len());
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_jpeg_decodes_after_optimize() {
        let jpeg = encoded(image::ImageFormat::Jpeg);
        let out = optimize(Path::new("photo.JPG"), &jpeg, &OptimizeConfig::default()).unwrap();
        assert!(out.len() <= jpeg.len());
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn test_jpeg_is_progressive() {
        let jpeg = crate::image::fixtures::noisy(image::ImageFormat::Jpeg);
        let out = optimize_jpeg(&jpeg, 75).unwrap();
        // SOF2: progressive frame
        assert!(out.windows(2).any(|w| w == [0xFF, 0xC2]));
        assert_eq!(image::load_from_memory(&out).unwrap().width(), 128);
    }

    #[test]
    fn test_svg_shrinks() {
        let svg = br##"<?xml version="1.0"?>
<!-- exported by an editor -->
<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10">
    <metadata>lots of editor metadata that nobody needs in production</metadata>
    <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>"##;
        let out = optimize(Path::new("logo.svg"), svg, &OptimizeConfig::default()).unwrap();
        assert!(out.len() < svg.len());
        assert!(String::from_utf8(out).unwrap().contains("<svg"));
    }

    #[test]
    fn test_unknown_extension_passes_through() {
        let out = optimize(Path::new("a.gif"), b"GIF89a", &OptimizeConfig::default()).unwrap();
        assert_eq!(out, b"GIF89a");
    }

    #[test]
    fn test_corrupt_png_is_error() {
        assert!(optimize(Path::new("a.png"), b"\x89PNG broken", &OptimizeConfig::default()).is_err());
    }
}
