//! Sequential video frame decoding.
//!
//! Rendering walks the timeline forward, so each source gets one long-lived `ffmpeg` process that
//! streams scaled frames on the output frame grid. Seeking backwards or far ahead restarts it.

use std::io::Read;
use std::process::{Child, ChildStdout};
use std::sync::Arc;

use crate::effects::chroma::ChromaKey;
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::media::decode::PreparedImage;
use crate::media::probe::{VideoSourceInfo, spawn_rgba_frame_stream};

/// Forward gap, in frames, still served by reading through instead of restarting.
const MAX_READ_AHEAD: u64 = 60;

pub(crate) struct StreamingDecoder {
    info: Arc<VideoSourceInfo>,
    width: u32,
    height: u32,
    fps: u32,
    key: Option<ChromaKey>,

    child: Option<Child>,
    stdout: Option<ChildStdout>,
    /// Grid index of the next frame the stream will yield.
    next_index: u64,
    eof: bool,
    current: Option<(u64, Arc<PreparedImage>)>,
    spawns: u64,
}

impl StreamingDecoder {
    pub(crate) fn new(
        info: Arc<VideoSourceInfo>,
        width: u32,
        height: u32,
        fps: u32,
        key: Option<ChromaKey>,
    ) -> Self {
        Self {
            info,
            width,
            height,
            fps: fps.max(1),
            key,
            child: None,
            stdout: None,
            next_index: 0,
            eof: false,
            current: None,
            spawns: 0,
        }
    }

    /// Premultiplied (and keyed, if configured) frame showing at `source_time`.
    ///
    /// Past the end of the stream the last decoded frame is held.
    pub(crate) fn frame_at(&mut self, source_time: f64) -> SpotDiffResult<Arc<PreparedImage>> {
        let target = (source_time.max(0.0) * f64::from(self.fps)).round() as u64;

        if let Some((idx, img)) = &self.current
            && (*idx == target || (self.eof && target >= *idx))
        {
            return Ok(img.clone());
        }

        let behind = self.current.as_ref().is_some_and(|(idx, _)| target < *idx);
        let too_far = target > self.next_index + MAX_READ_AHEAD;
        if self.stdout.is_none() && !self.eof || behind || too_far {
            self.restart(target)?;
        }

        while !self.eof && self.next_index <= target {
            match self.read_frame()? {
                Some(img) => {
                    self.current = Some((self.next_index, img));
                    self.next_index += 1;
                }
                None => self.finish_stream(),
            }
        }

        match &self.current {
            Some((_, img)) => Ok(img.clone()),
            None => Ok(Arc::new(PreparedImage {
                width: self.width,
                height: self.height,
                rgba8_premul: Arc::new(vec![0u8; self.frame_len()]),
            })),
        }
    }

    pub(crate) fn spawns(&self) -> u64 {
        self.spawns
    }

    fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    fn restart(&mut self, index: u64) -> SpotDiffResult<()> {
        self.finish_stream();
        let start = index as f64 / f64::from(self.fps);
        tracing::debug!(
            source = %self.info.source_path.display(),
            start,
            "starting video decode stream"
        );
        let mut child = spawn_rgba_frame_stream(&self.info, start, self.width, self.height, self.fps)?;
        self.stdout = child.stdout.take();
        self.child = Some(child);
        self.next_index = index;
        self.eof = false;
        self.current = None;
        self.spawns += 1;
        Ok(())
    }

    fn read_frame(&mut self) -> SpotDiffResult<Option<Arc<PreparedImage>>> {
        let len = self.frame_len();
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buf = vec![0u8; len];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => {
                return Err(SpotDiffError::media(format!(
                    "failed to read frame from ffmpeg for '{}': {e}",
                    self.info.source_path.display()
                )));
            }
        }

        match self.key {
            Some(key) => key.apply_in_place(&mut buf, self.width),
            None => premultiply_rgba8_in_place(&mut buf),
        }
        Ok(Some(Arc::new(PreparedImage {
            width: self.width,
            height: self.height,
            rgba8_premul: Arc::new(buf),
        })))
    }

    fn finish_stream(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.eof = true;
    }
}

impl Drop for StreamingDecoder {
    fn drop(&mut self) {
        self.finish_stream();
    }
}
