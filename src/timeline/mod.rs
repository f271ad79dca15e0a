//! Scene timeline compositor and program assembler.
//!
//! Everything here is layout: it produces an immutable description of which layer and audio
//! placement is live at which time. No pixels are produced until [`crate::render`] walks it.

pub(crate) mod background;
pub(crate) mod program;
pub(crate) mod scene;
pub(crate) mod schedule;
