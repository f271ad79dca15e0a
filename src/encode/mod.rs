//! Encoding sinks.
//!
//! Sinks consume composited frames in timeline order; the mixed audio track is handed over as a
//! raw PCM file in [`sink::SinkConfig`].

/// `ffmpeg`-based MP4 output.
pub(crate) mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub(crate) mod sink;
