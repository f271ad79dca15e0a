use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use image::imageops::FilterType;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::premultiply_rgba8_in_place;

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Target size for a decoded still.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFit {
    /// Keep the native size.
    Native,
    /// Resize to exactly `width`x`height`.
    Exact { width: u32, height: u32 },
    /// Resize to `width`, preserving aspect ratio.
    Width(u32),
}

impl ImageFit {
    /// Output size for a source of `src_w`x`src_h`.
    pub fn resolve(self, src_w: u32, src_h: u32) -> (u32, u32) {
        match self {
            Self::Native => (src_w, src_h),
            Self::Exact { width, height } => (width.max(1), height.max(1)),
            Self::Width(width) => {
                let width = width.max(1);
                if src_w == 0 {
                    return (width, src_h.max(1));
                }
                let h = (f64::from(src_h) * f64::from(width) / f64::from(src_w)).round() as u32;
                (width, h.max(1))
            }
        }
    }
}

/// Decode encoded image bytes, resize according to `fit`, and premultiply.
pub fn decode_image(bytes: &[u8], fit: ImageFit) -> SpotDiffResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let mut rgba = dyn_img.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let (width, height) = fit.resolve(src_w, src_h);
    if (width, height) != (src_w, src_h) {
        rgba = image::imageops::resize(&rgba, width, height, FilterType::Triangle);
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Read and decode an image file.
pub fn load_image(path: &Path, fit: ImageFit) -> SpotDiffResult<PreparedImage> {
    let bytes = std::fs::read(path).map_err(|e| {
        SpotDiffError::media(format!("failed to read image '{}': {e}", path.display()))
    })?;
    decode_image(&bytes, fit)
}

/// A uniformly colored image.
pub fn solid_image(width: u32, height: u32, color: Rgba8) -> PreparedImage {
    let px = color.to_premul_array();
    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for _ in 0..(width as usize) * (height as usize) {
        data.extend_from_slice(&px);
    }
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
