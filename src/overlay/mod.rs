//! Procedural overlays: graphics computed from time alone, with no backing asset.

pub(crate) mod countdown;
pub(crate) mod generator;
pub(crate) mod markers;
pub(crate) mod raster;
