use std::sync::Arc;

use vello_cpu::kurbo::{Rect, Shape};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::media::decode::PreparedImage;

/// Flattening tolerance used when converting curves to paths.
const TOLERANCE: f64 = 0.1;

/// Rasterize with a fresh `vello_cpu` context of `width`x`height` into a premultiplied image.
pub(crate) fn rasterize(
    width: u32,
    height: u32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) -> SpotDiffResult<PreparedImage> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SpotDiffError::render("overlay width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SpotDiffError::render("overlay height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    draw(&mut ctx);
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data_as_u8_slice().to_vec()),
    })
}

pub(crate) fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

pub(crate) fn fill_shape(ctx: &mut vello_cpu::RenderContext, shape: &impl Shape) {
    ctx.fill_path(&shape.to_path(TOLERANCE));
}

pub(crate) fn stroke_shape(ctx: &mut vello_cpu::RenderContext, shape: &impl Shape, width: f64) {
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
    ctx.stroke_path(&shape.to_path(TOLERANCE));
}

// Segment order: a (top), b (top right), c (bottom right), d (bottom), e (bottom left),
// f (top left), g (middle).
const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],
    [false, true, true, false, false, false, false],
    [true, true, false, true, true, false, true],
    [true, true, true, true, false, false, true],
    [false, true, true, false, false, true, true],
    [true, false, true, true, false, true, true],
    [true, false, true, true, true, true, true],
    [true, true, true, false, false, false, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// Glyph metrics for seven-segment numerals.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DigitStyle {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) thickness: f64,
    pub(crate) gap: f64,
}

impl DigitStyle {
    /// Advance width of `text` in pixels.
    pub(crate) fn text_width(&self, text: &str) -> f64 {
        let n = text.chars().filter(char::is_ascii_digit).count() as f64;
        if n == 0.0 {
            return 0.0;
        }
        n * self.width + (n - 1.0) * self.gap
    }
}

/// Draw the ASCII digits of `text` with their box's top-left at `(x, y)`. Other chars are skipped.
pub(crate) fn fill_digits(
    ctx: &mut vello_cpu::RenderContext,
    text: &str,
    x: f64,
    y: f64,
    style: DigitStyle,
) {
    let mut cx = x;
    for d in text.chars().filter_map(|c| c.to_digit(10)) {
        for rect in digit_rects(d as usize, cx, y, style) {
            fill_shape(ctx, &rect);
        }
        cx += style.width + style.gap;
    }
}

fn digit_rects(d: usize, x: f64, y: f64, s: DigitStyle) -> Vec<Rect> {
    let (w, h, th) = (s.width, s.height, s.thickness);
    let mid = y + h / 2.0;
    let all = [
        Rect::new(x, y, x + w, y + th),
        Rect::new(x + w - th, y, x + w, mid),
        Rect::new(x + w - th, mid, x + w, y + h),
        Rect::new(x, y + h - th, x + w, y + h),
        Rect::new(x, mid, x + th, y + h),
        Rect::new(x, y, x + th, mid),
        Rect::new(x, mid - th / 2.0, x + w, mid + th / 2.0),
    ];
    DIGIT_SEGMENTS[d % 10]
        .iter()
        .zip(all)
        .filter(|(on, _)| **on)
        .map(|(_, r)| r)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/raster.rs"]
mod tests;
