//! spotdiff renders spot-the-difference quiz videos.
//!
//! A [`Job`] names the puzzles; an [`AssetLibrary`] directory supplies bumpers, backgrounds,
//! keyed inserts and audio cues, any of which may be missing. The flow is:
//!
//! - Load and validate a [`Job`]
//! - Lay it out into a [`Program`] with [`assemble_program`]
//! - Render frames into a [`FrameSink`], or straight to MP4 with [`render_to_mp4`]
//! - Optionally upload the result through a [`Publisher`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod audio;
pub(crate) mod effects;
/// Frame sinks and `ffmpeg` encoding.
pub mod encode;
/// Placeholder asset generation.
pub mod fixtures;
pub(crate) mod job;
pub(crate) mod media;
pub(crate) mod overlay;
/// Upload client.
pub mod publish;
/// Frame compositing and range rendering.
pub mod render;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point, Rgba8};
pub use crate::foundation::error::{SpotDiffError, SpotDiffResult};

pub use crate::effects::chroma::ChromaKey;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::fixtures::{FixtureReport, generate_fixtures, sample_job};
pub use crate::job::model::{DiffPoint, Job, PointSpace, Question, Timing};
pub use crate::media::library::AssetLibrary;
pub use crate::media::resolve::MediaResolver;
pub use crate::publish::credentials::Credentials;
pub use crate::publish::resumable::{ChunkOutcome, ResumableUpload, UploadTransport};
pub use crate::publish::youtube::{
    DEFAULT_TAGS, DEFAULT_TITLE, Privacy, Publisher, VideoMetadata, YouTubePublisher,
};
pub use crate::render::compositor::Compositor;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{
    RenderOpts, RenderStats, full_range, render_frame_at, render_range, render_to_mp4,
};
pub use crate::timeline::program::{
    CANVAS, FPS, Program, ProgramSummary, QuestionSummary, assemble_program,
};
pub use crate::timeline::schedule::SceneSchedule;
