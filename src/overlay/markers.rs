//! Circular difference markers.

use vello_cpu::kurbo::Circle;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::SpotDiffResult;
use crate::media::decode::PreparedImage;
use crate::overlay::generator::{OverlayBounds, OverlayGenerator};
use crate::overlay::raster::{rasterize, set_color, stroke_shape};

pub const MARKER_STROKE: f64 = 8.0;

/// Reveal order colors: blue, yellow, red.
pub const MARKER_COLORS: [Rgba8; 3] = [
    Rgba8::rgba(0, 120, 255, 255),
    Rgba8::rgba(255, 220, 0, 255),
    Rgba8::rgba(255, 0, 0, 255),
];

/// Unfilled circles of one color around a set of canvas points.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffMarker {
    pub centers: Vec<Point>,
    pub radius: f64,
    pub color: Rgba8,
}

impl DiffMarker {
    /// Marker for the `index`-th revealed difference (0-based).
    pub fn for_reveal(index: usize, centers: Vec<Point>, radius: f64) -> Self {
        Self {
            centers,
            radius,
            color: MARKER_COLORS[index % MARKER_COLORS.len()],
        }
    }
}

impl OverlayGenerator for DiffMarker {
    fn bounds(&self) -> OverlayBounds {
        let pad = self.radius + MARKER_STROKE / 2.0 + 1.0;
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for c in &self.centers {
            x0 = x0.min(c.x - pad);
            y0 = y0.min(c.y - pad);
            x1 = x1.max(c.x + pad);
            y1 = y1.max(c.y + pad);
        }
        if self.centers.is_empty() {
            return OverlayBounds {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            };
        }
        let x = x0.floor() as i64;
        let y = y0.floor() as i64;
        OverlayBounds {
            x,
            y,
            width: ((x1.ceil() as i64) - x).max(1) as u32,
            height: ((y1.ceil() as i64) - y).max(1) as u32,
        }
    }

    fn frame_key(&self, _t: f64) -> u64 {
        0
    }

    fn render(&self, _t: f64) -> SpotDiffResult<PreparedImage> {
        let b = self.bounds();
        let (ox, oy) = (b.x as f64, b.y as f64);
        rasterize(b.width, b.height, |ctx| {
            set_color(ctx, self.color);
            for c in &self.centers {
                let circle = Circle::new((c.x - ox, c.y - oy), self.radius);
                stroke_shape(ctx, &circle, MARKER_STROKE);
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/markers.rs"]
mod tests;
