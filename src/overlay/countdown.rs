//! Live countdown badge.

use vello_cpu::kurbo::RoundedRect;

use crate::foundation::core::Rgba8;
use crate::foundation::error::SpotDiffResult;
use crate::media::decode::PreparedImage;
use crate::overlay::generator::{OverlayBounds, OverlayGenerator};
use crate::overlay::raster::{DigitStyle, fill_digits, fill_shape, rasterize, set_color};

pub const BADGE_WIDTH: u32 = 260;
pub const BADGE_HEIGHT: u32 = 120;
pub const BADGE_MARGIN: i64 = 24;
const BADGE_RADIUS: f64 = 20.0;
const BADGE_FILL: Rgba8 = Rgba8::rgba(0, 0, 0, 150);
const NUMERAL_COLOR: Rgba8 = Rgba8::rgb(255, 255, 255);
const NUMERAL_STYLE: DigitStyle = DigitStyle {
    width: 40.0,
    height: 72.0,
    thickness: 10.0,
    gap: 12.0,
};

/// Seconds-remaining badge, right-anchored near the top of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownBadge {
    pub start_seconds: u32,
    pub canvas_width: u32,
}

impl CountdownBadge {
    /// Create a badge counting down from `start_seconds`, anchored to the right edge of a canvas `canvas_width` wide.
    pub fn new(start_seconds: u32, canvas_width: u32) -> Self {
        Self {
            start_seconds,
            canvas_width,
        }
    }

    /// `max(0, start - floor(t))`.
    pub fn remaining(&self, t: f64) -> u32 {
        let elapsed = t.max(0.0).floor();
        let left = f64::from(self.start_seconds) - elapsed;
        if left <= 0.0 { 0 } else { left as u32 }
    }

    /// Remaining whole seconds at local time `t`, as drawn.
    pub fn label(&self, t: f64) -> String {
        format_remaining(self.remaining(t))
    }
}

/// Two digits below 100, the plain integer otherwise.
pub fn format_remaining(n: u32) -> String {
    if n < 100 {
        format!("{n:02}")
    } else {
        n.to_string()
    }
}

impl OverlayGenerator for CountdownBadge {
    fn bounds(&self) -> OverlayBounds {
        OverlayBounds {
            x: i64::from(self.canvas_width) - i64::from(BADGE_WIDTH) - BADGE_MARGIN,
            y: BADGE_MARGIN,
            width: BADGE_WIDTH,
            height: BADGE_HEIGHT,
        }
    }

    fn frame_key(&self, t: f64) -> u64 {
        u64::from(self.remaining(t))
    }

    fn render(&self, t: f64) -> SpotDiffResult<PreparedImage> {
        let label = self.label(t);
        let w = f64::from(BADGE_WIDTH);
        let h = f64::from(BADGE_HEIGHT);
        rasterize(BADGE_WIDTH, BADGE_HEIGHT, |ctx| {
            set_color(ctx, BADGE_FILL);
            fill_shape(ctx, &RoundedRect::new(0.0, 0.0, w, h, BADGE_RADIUS));

            let text_x = ((w - NUMERAL_STYLE.text_width(&label)) / 2.0).round();
            let text_y = ((h - NUMERAL_STYLE.height) / 2.0).round();
            set_color(ctx, NUMERAL_COLOR);
            fill_digits(ctx, &label, text_x, text_y, NUMERAL_STYLE);
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/countdown.rs"]
mod tests;
