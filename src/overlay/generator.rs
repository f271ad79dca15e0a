use std::fmt::Debug;

use crate::foundation::error::SpotDiffResult;
use crate::media::decode::PreparedImage;

/// Canvas-space placement of a generator's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlayBounds {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Stateless procedural graphics.
///
/// `render` must be a pure function of the local time `t` (seconds since the overlay started).
/// Two times with equal [`OverlayGenerator::frame_key`] must render identical pixels, which lets
/// the compositor reuse the previous raster.
pub trait OverlayGenerator: Debug + Send + Sync {
    /// Where rendered frames are placed on the canvas; fixed for the overlay's lifetime.
    fn bounds(&self) -> OverlayBounds;

    fn frame_key(&self, t: f64) -> u64;

    /// Premultiplied RGBA frame of `bounds().width`x`bounds().height`.
    fn render(&self, t: f64) -> SpotDiffResult<PreparedImage>;
}
