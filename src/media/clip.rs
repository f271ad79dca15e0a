//! Edit-list clips.
//!
//! A [`Clip`] is an ordered list of source segments played back to back. Video and audio clips
//! are the same structure over different source types, so trimming, repeating and the
//! loop/extend primitive are written once.

use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::media::probe::{AudioPcm, VideoSourceInfo};

/// One contiguous span `[src_start, src_end)` of a source.
#[derive(Clone, Debug)]
pub struct Segment<S> {
    pub source: S,
    pub src_start: f64,
    pub src_end: f64,
}

impl<S> Segment<S> {
    fn len(&self) -> f64 {
        (self.src_end - self.src_start).max(0.0)
    }
}

/// Ordered list of segments with an exact nominal duration.
#[derive(Clone, Debug)]
pub struct Clip<S> {
    segments: Vec<Segment<S>>,
    duration: f64,
}

impl<S: Clone> Clip<S> {
    /// The leading `duration` seconds of `source`.
    pub fn from_source(source: S, duration: f64) -> Self {
        let duration = duration.max(0.0);
        Self {
            segments: vec![Segment {
                source,
                src_start: 0.0,
                src_end: duration,
            }],
            duration,
        }
    }

    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Segments in playback order.
    pub fn segments(&self) -> &[Segment<S>] {
        &self.segments
    }

    /// `copies` whole copies of this clip, back to back.
    pub fn repeat(&self, copies: usize) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() * copies);
        for _ in 0..copies {
            segments.extend(self.segments.iter().cloned());
        }
        Self {
            segments,
            duration: self.duration * copies as f64,
        }
    }

    /// The `[start, end)` portion of this clip.
    pub fn subclip(&self, start: f64, end: f64) -> SpotDiffResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
            return Err(SpotDiffError::validation(format!(
                "invalid subclip range [{start}, {end})"
            )));
        }
        if end > self.duration + 1e-9 {
            return Err(SpotDiffError::validation(format!(
                "subclip end {end} exceeds clip duration {}",
                self.duration
            )));
        }

        let mut segments = Vec::new();
        let mut offset = 0.0;
        for seg in &self.segments {
            let seg_start = offset;
            let seg_end = offset + seg.len();
            offset = seg_end;
            if seg_end <= start {
                continue;
            }
            if seg_start >= end {
                break;
            }
            let cut_in = (start - seg_start).max(0.0);
            let cut_out = (seg_end - end).max(0.0);
            segments.push(Segment {
                source: seg.source.clone(),
                src_start: seg.src_start + cut_in,
                src_end: seg.src_end - cut_out,
            });
        }

        Ok(Self {
            segments,
            duration: end - start,
        })
    }

    /// Map clip-local time `t` to the source and source time that play at that moment.
    pub fn locate(&self, t: f64) -> Option<(&S, f64)> {
        if !(0.0..self.duration).contains(&t) {
            return None;
        }
        let mut offset = 0.0;
        for seg in &self.segments {
            let len = seg.len();
            if t < offset + len {
                return Some((&seg.source, seg.src_start + (t - offset)));
            }
            offset += len;
        }
        // Accumulated rounding can leave `t` a hair past the final segment.
        self.segments
            .last()
            .map(|seg| (&seg.source, seg.src_end.max(seg.src_start)))
    }
}

/// Extend or cut `clip` to exactly `target` seconds by whole-cycle repetition.
///
/// Clips at least `target` long are trimmed to their leading `target` seconds; shorter clips are
/// repeated `floor(target / d) + 1` times and the concatenation is trimmed.
pub fn loop_to_duration<S: Clone>(clip: &Clip<S>, target: f64) -> SpotDiffResult<Clip<S>> {
    if !target.is_finite() || target < 0.0 {
        return Err(SpotDiffError::validation(format!(
            "loop target duration must be finite and >= 0 (got {target})"
        )));
    }
    let d = clip.duration();
    if !d.is_finite() || d <= 0.0 {
        return Err(SpotDiffError::validation(
            "cannot loop a zero-duration clip",
        ));
    }
    if d >= target {
        return clip.subclip(0.0, target);
    }
    let repeats = (target / d).floor() as usize + 1;
    clip.repeat(repeats).subclip(0.0, target)
}

/// Where video pixels come from.
#[derive(Clone, Debug)]
pub enum VideoSource {
    /// A decodable video file.
    File(Arc<VideoSourceInfo>),
    /// A synthetic single-color frame.
    Solid {
        color: Rgba8,
        width: u32,
        height: u32,
    },
}

impl VideoSource {
    /// Native pixel size.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::File(info) => (info.width, info.height),
            Self::Solid { width, height, .. } => (*width, *height),
        }
    }
}

/// Where audio samples come from.
#[derive(Clone, Debug)]
pub enum AudioSource {
    /// Decoded PCM at the mix sample rate.
    Pcm(Arc<AudioPcm>),
    /// Digital silence.
    Silence,
}

pub type VideoClip = Clip<VideoSource>;
pub type AudioClip = Clip<AudioSource>;

impl VideoClip {
    /// Native size of the first segment's source.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.segments.first().map(|s| s.source.dimensions())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/clip.rs"]
mod tests;
