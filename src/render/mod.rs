//! Frame rendering: walks a laid-out [`crate::timeline::program::Program`] frame by frame.

pub(crate) mod compositor;
pub(crate) mod decoder;
pub(crate) mod frame;
pub(crate) mod pipeline;
