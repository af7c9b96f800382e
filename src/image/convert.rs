//! Raster conversion to modern formats.

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use ravif::{Img, RGBA8};

use crate::config::ImageFormat;

/// AVIF encoder speed (1 slowest .. 10 fastest).
const AVIF_SPEED: u8 = 6;

/// Decode `data` and re-encode it as `format` at `quality` (1..=100).
pub fn convert(data: &[u8], format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("failed to decode image")?;
    match format {
        ImageFormat::Webp => to_webp(&img, quality),
        ImageFormat::Avif => to_avif(&img, quality),
    }
}

/// Lossy WebP.
fn to_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, f32::from(quality))
        .map_err(|e| anyhow!("failed to encode WebP: {e:?}"))?;
    Ok(encoded.to_vec())
}

fn to_avif(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let pixels: Vec<RGBA8> = rgba
        .pixels()
        .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();

    let encoded = ravif::Encoder::new()
        .with_quality(f32::from(quality))
        .with_speed(AVIF_SPEED)
        .encode_rgba(Img::new(
            pixels.as_slice(),
            rgba.width() as usize,
            rgba.height() as usize,
        ))
        .context("failed to encode AVIF")?;
    Ok(encoded.avif_file)
}
