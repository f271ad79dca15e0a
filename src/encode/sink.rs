use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::render::frame::FrameRGBA;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Total frames that will be pushed.
    pub total_frames: u64,
    /// Mixed soundtrack, if any.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM soundtrack location and format.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Interleaved `f32le` PCM file.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing [`FrameIndex`] order.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> SpotDiffResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SpotDiffResult<()>;
    fn end(&mut self) -> SpotDiffResult<()>;
}

/// Collects frames in memory. Used by tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SpotDiffResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SpotDiffResult<()> {
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(SpotDiffError::render("in-memory sink received out-of-order frame"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SpotDiffResult<()> {
        self.finished = true;
        Ok(())
    }
}
