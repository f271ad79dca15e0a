//! Media Source Resolver.
//!
//! Turns nominal asset names into playable clips. Missing assets never fail: they become
//! synthetic clips of a caller-chosen duration (solid color for video, silence for audio).
//! Assets that exist but cannot be decoded are errors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::media::clip::{AudioClip, AudioSource, VideoClip, VideoSource};
use crate::media::decode::{ImageFit, PreparedImage, load_image, solid_image};
use crate::media::library::AssetLibrary;
use crate::media::probe::{MIX_SAMPLE_RATE, decode_audio_f32_stereo, probe_video};

/// Placeholder fill for missing video fragments.
pub const PLACEHOLDER_COLOR: Rgba8 = Rgba8::rgb(20, 20, 20);
/// Placeholder fill when the background pool is empty.
pub const BACKGROUND_PLACEHOLDER_COLOR: Rgba8 = Rgba8::rgb(30, 30, 30);
/// Placeholder fill for missing puzzle panels.
pub const PANEL_PLACEHOLDER_COLOR: Rgba8 = Rgba8::rgb(240, 240, 240);

pub const BUMPER_FALLBACK_SECS: f64 = 2.0;
pub const QUESTION_BUMPER_FALLBACK_SECS: f64 = 3.0;
pub const BACKGROUND_FALLBACK_SECS: f64 = 8.0;
pub const COUNT10_FALLBACK_SECS: f64 = 10.0;
pub const ALARM_FALLBACK_SECS: f64 = 2.0;
pub const BGM_FALLBACK_SECS: f64 = 300.0;
pub const DESCRIPTION_FALLBACK_SECS: f64 = 3.0;
pub const TIME_CUE_FALLBACK_SECS: f64 = 1.0;
pub const ANSWER_FALLBACK_SECS: f64 = 2.0;
pub const CALLOUT_FALLBACK_SECS: f64 = 1.5;
pub const CHEER_FALLBACK_SECS: f64 = 2.0;

/// What the caller expects to find at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Placeholder parameters used when an asset is absent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fallback {
    pub duration: f64,
    pub color: Rgba8,
}

impl Fallback {
    /// Create a fallback of `duration` seconds in the default placeholder color.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            color: PLACEHOLDER_COLOR,
        }
    }

    /// Override the placeholder video color.
    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }
}

/// A resolved asset: optional video track, optional audio track, and the nominal duration.
#[derive(Clone, Debug)]
pub struct MediaClip {
    pub video: Option<VideoClip>,
    pub audio: Option<AudioClip>,
    pub duration: f64,
    /// `true` when the asset was absent and a placeholder was synthesized.
    pub placeholder: bool,
}

/// Resolves asset names against an [`AssetLibrary`], caching decoded media per name.
pub struct MediaResolver {
    library: AssetLibrary,
    canvas: Canvas,
    clips: HashMap<(String, MediaKind), MediaClip>,
    images: HashMap<(String, (u32, u32)), Arc<PreparedImage>>,
}

impl MediaResolver {
    /// Placeholder video is sized to `canvas`.
    pub fn new(library: AssetLibrary, canvas: Canvas) -> Self {
        Self {
            library,
            canvas,
            clips: HashMap::new(),
            images: HashMap::new(),
        }
    }

    /// Asset library this resolver reads from.
    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    /// Canvas that placeholder video is sized to.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Resolve `rel` as `kind`, substituting a placeholder built from `fallback` when absent.
    pub fn resolve(
        &mut self,
        rel: &str,
        kind: MediaKind,
        fallback: Fallback,
    ) -> SpotDiffResult<MediaClip> {
        let key = (rel.to_string(), kind);
        if let Some(hit) = self.clips.get(&key) {
            return Ok(hit.clone());
        }

        let clip = if self.library.exists(rel) {
            let path = self.library.path(rel)?;
            match kind {
                MediaKind::Video => load_video(&path)?,
                MediaKind::Audio => load_audio(&path)?,
            }
        } else {
            tracing::debug!(asset = rel, ?kind, duration = fallback.duration, "asset missing, using placeholder");
            self.placeholder(kind, fallback)
        };

        self.clips.insert(key, clip.clone());
        Ok(clip)
    }

    /// Shorthand for [`MediaKind::Video`] with the default placeholder color.
    pub fn video(&mut self, rel: &str, fallback_secs: f64) -> SpotDiffResult<MediaClip> {
        self.resolve(rel, MediaKind::Video, Fallback::new(fallback_secs))
    }

    /// Shorthand for [`MediaKind::Audio`].
    pub fn audio(&mut self, rel: &str, fallback_secs: f64) -> SpotDiffResult<MediaClip> {
        self.resolve(rel, MediaKind::Audio, Fallback::new(fallback_secs))
    }

    /// Decode the still at `rel` resized per `fit`, or `None` when absent.
    pub fn image(&mut self, rel: &str, fit: ImageFit) -> SpotDiffResult<Option<Arc<PreparedImage>>> {
        if !self.library.exists(rel) {
            tracing::debug!(asset = rel, "image missing");
            return Ok(None);
        }
        let size_key = match fit {
            ImageFit::Native => (0, 0),
            ImageFit::Exact { width, height } => (width, height),
            ImageFit::Width(w) => (w, 0),
        };
        let key = (rel.to_string(), size_key);
        if let Some(hit) = self.images.get(&key) {
            return Ok(Some(hit.clone()));
        }
        let img = Arc::new(load_image(&self.library.path(rel)?, fit)?);
        self.images.insert(key, img.clone());
        Ok(Some(img))
    }

    /// Native pixel size of the still at `rel`, read from its header. `None` when absent.
    pub fn image_size(&self, rel: &str) -> SpotDiffResult<Option<(u32, u32)>> {
        if !self.library.exists(rel) {
            return Ok(None);
        }
        let path = self.library.path(rel)?;
        let size = image::image_dimensions(&path).map_err(|e| {
            SpotDiffError::media(format!("failed to read image header '{}': {e}", path.display()))
        })?;
        Ok(Some(size))
    }

    /// Decode the still at `rel` at exactly `width`x`height`, or a solid panel when absent.
    pub fn image_or_solid(
        &mut self,
        rel: &str,
        width: u32,
        height: u32,
        color: Rgba8,
    ) -> SpotDiffResult<Arc<PreparedImage>> {
        match self.image(rel, ImageFit::Exact { width, height })? {
            Some(img) => Ok(img),
            None => Ok(Arc::new(solid_image(width, height, color))),
        }
    }

    fn placeholder(&self, kind: MediaKind, fallback: Fallback) -> MediaClip {
        let duration = fallback.duration.max(0.0);
        match kind {
            MediaKind::Video => MediaClip {
                video: Some(VideoClip::from_source(
                    VideoSource::Solid {
                        color: fallback.color,
                        width: self.canvas.width,
                        height: self.canvas.height,
                    },
                    duration,
                )),
                audio: None,
                duration,
                placeholder: true,
            },
            MediaKind::Audio => MediaClip {
                video: None,
                audio: Some(AudioClip::from_source(AudioSource::Silence, duration)),
                duration,
                placeholder: true,
            },
        }
    }
}

fn load_video(path: &std::path::Path) -> SpotDiffResult<MediaClip> {
    let info = Arc::new(probe_video(path)?);
    let duration = info.duration_sec;
    let audio = if info.has_audio {
        let pcm = decode_audio_f32_stereo(path, MIX_SAMPLE_RATE)?;
        (!pcm.interleaved_f32.is_empty())
            .then(|| AudioClip::from_source(AudioSource::Pcm(Arc::new(pcm)), duration))
    } else {
        None
    };
    Ok(MediaClip {
        video: Some(VideoClip::from_source(VideoSource::File(info), duration)),
        audio,
        duration,
        placeholder: false,
    })
}

fn load_audio(path: &std::path::Path) -> SpotDiffResult<MediaClip> {
    let pcm = decode_audio_f32_stereo(path, MIX_SAMPLE_RATE)?;
    let duration = pcm.duration_sec();
    Ok(MediaClip {
        video: None,
        audio: Some(AudioClip::from_source(AudioSource::Pcm(Arc::new(pcm)), duration)),
        duration,
        placeholder: false,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/resolve.rs"]
mod tests;
