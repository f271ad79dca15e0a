//! Chroma keying.
//!
//! Keying runs on straight-alpha frames straight out of the decoder and leaves them
//! premultiplied, ready for [`crate::effects::composite::blit_over`].

use rayon::prelude::*;

use crate::foundation::core::Rgba8;
use crate::foundation::math::premultiply_rgba8_in_place;

/// Width of the alpha ramp above the threshold, in RGB distance units.
pub const KEY_SOFTNESS: f64 = 12.0;

/// Makes pixels close to `color` transparent.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ChromaKey {
    pub color: Rgba8,
    /// Euclidean RGB distance below which a pixel is fully removed.
    pub threshold: f64,
}

impl ChromaKey {
    /// Create a key for `color`; `threshold` is a Euclidean RGB distance.
    pub fn new(color: Rgba8, threshold: f64) -> Self {
        Self { color, threshold }
    }

    /// Coverage factor in `[0, 1]` for a pixel with the given RGB.
    pub fn coverage(&self, r: u8, g: u8, b: u8) -> f64 {
        let dr = f64::from(r) - f64::from(self.color.r);
        let dg = f64::from(g) - f64::from(self.color.g);
        let db = f64::from(b) - f64::from(self.color.b);
        let dist = (dr * dr + dg * dg + db * db).sqrt();
        if dist < self.threshold {
            0.0
        } else if dist >= self.threshold + KEY_SOFTNESS {
            1.0
        } else {
            (dist - self.threshold) / KEY_SOFTNESS
        }
    }

    /// Key a straight-alpha RGBA8 frame in place and premultiply it.
    pub fn apply_in_place(&self, rgba: &mut [u8], width: u32) {
        let stride = (width as usize * 4).max(4);
        rgba.par_chunks_mut(stride).for_each(|row| {
            for px in row.chunks_exact_mut(4) {
                let k = self.coverage(px[0], px[1], px[2]);
                if k < 1.0 {
                    px[3] = (f64::from(px[3]) * k).round() as u8;
                }
            }
            premultiply_rgba8_in_place(row);
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chroma.rs"]
mod tests;
