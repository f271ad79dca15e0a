use crate::foundation::core::{Canvas, Rgba8};
use crate::effects::composite::{Pixels, PixelsMut, fill};

/// A composited output frame.
///
/// Pixels are premultiplied RGBA8, tightly packed and row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// A frame filled with `color`.
    pub fn filled(canvas: Canvas, color: Rgba8) -> Self {
        let mut data = vec![0u8; canvas.frame_len()];
        fill(&mut data, color.to_premul_array());
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    pub fn clear(&mut self, color: Rgba8) {
        fill(&mut self.data, color.to_premul_array());
    }

    /// Premultiplied RGBA at (`x`, `y`), or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn pixels(&self) -> Pixels<'_> {
        Pixels {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn pixels_mut(&mut self) -> PixelsMut<'_> {
        PixelsMut {
            width: self.width,
            height: self.height,
            data: &mut self.data,
        }
    }
}
