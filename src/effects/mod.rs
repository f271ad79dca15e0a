//! Pixel-level effects on premultiplied RGBA8 buffers.

pub(crate) mod chroma;
pub(crate) mod composite;
