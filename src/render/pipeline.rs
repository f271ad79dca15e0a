use std::path::{Path, PathBuf};

use crate::audio::mix::{mix_placements, write_f32le_file};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange, Rgba8};
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::secs_to_samples;
use crate::media::probe::{MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::render::compositor::Compositor;
use crate::render::frame::FrameRGBA;
use crate::timeline::program::Program;

/// Options for [`render_range`] and [`render_to_mp4`].
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Worker threads for per-frame pixel work. `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Color under every frame.
    pub background: Rgba8,
    /// Mix and mux the audio track.
    pub audio: bool,
    pub overwrite: bool,
    /// x264 preset.
    pub preset: String,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            threads: None,
            background: Rgba8::rgb(0, 0, 0),
            audio: true,
            overwrite: true,
            preset: "medium".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    /// `ffmpeg` decode processes started.
    pub decoder_spawns: u64,
}

/// Render one frame at index `frame`.
pub fn render_frame_at(program: &Program, frame: FrameIndex, background: Rgba8) -> SpotDiffResult<FrameRGBA> {
    let t = program.fps.frames_to_secs(frame.0);
    Compositor::new(background).render(program, t)
}

/// Full frame range of `program`.
pub fn full_range(program: &Program) -> SpotDiffResult<FrameRange> {
    FrameRange::new(FrameIndex(0), FrameIndex(program.total_frames()))
}

/// Render `range` into `sink`, in order.
///
/// `audio` is forwarded to the sink untouched; see [`render_to_mp4`] for the mixdown.
#[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
pub fn render_range(
    program: &Program,
    range: FrameRange,
    sink: &mut dyn FrameSink,
    opts: &RenderOpts,
    audio: Option<AudioInputConfig>,
) -> SpotDiffResult<RenderStats> {
    if range.is_empty() {
        return Err(SpotDiffError::validation("render range must be non-empty"));
    }
    if range.end.0 > program.total_frames() {
        return Err(SpotDiffError::validation(format!(
            "render range end {} exceeds program length {} frames",
            range.end.0,
            program.total_frames()
        )));
    }

    let pool = build_thread_pool(opts.threads)?;
    sink.begin(SinkConfig {
        width: program.canvas.width,
        height: program.canvas.height,
        fps: program.fps,
        total_frames: range.len_frames(),
        audio,
    })?;

    let mut compositor = Compositor::new(opts.background);
    let mut frame = FrameRGBA::filled(program.canvas, opts.background);
    let mut stats = RenderStats::default();
    let log_every = u64::from((program.fps.num / program.fps.den.max(1)).max(1));
    for f in range.start.0..range.end.0 {
        let t = program.fps.frames_to_secs(f);
        pool.install(|| compositor.render_into(program, t, &mut frame))?;
        sink.push_frame(FrameIndex(f), &frame)?;
        stats.frames_total += 1;
        stats.frames_rendered += 1;
        if stats.frames_rendered % log_every == 0 {
            tracing::info!(frame = f, t, total = range.len_frames(), "rendering");
        }
    }
    sink.end()?;

    stats.decoder_spawns = compositor.decoder_spawns();
    tracing::info!(
        frames = stats.frames_rendered,
        decoder_spawns = stats.decoder_spawns,
        "render finished"
    );
    Ok(stats)
}

/// Render `range` of `program` to an H.264/AAC MP4 at `out_path` using the system `ffmpeg`.
pub fn render_to_mp4(
    program: &Program,
    out_path: impl Into<PathBuf>,
    range: FrameRange,
    opts: &RenderOpts,
) -> SpotDiffResult<RenderStats> {
    let out_path = out_path.into();
    let mut audio_tmp = TempFileGuard(None);
    let audio = if opts.audio {
        let path = temp_audio_path();
        write_range_mix(program, range, &path)?;
        audio_tmp.0 = Some(path.clone());
        Some(AudioInputConfig {
            path,
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
        })
    } else {
        None
    };

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        overwrite: opts.overwrite,
        flatten: opts.background,
        preset: opts.preset.clone(),
        ..FfmpegSinkOpts::new(out_path)
    });
    let stats = render_range(program, range, &mut sink, opts, audio)?;
    drop(audio_tmp);
    Ok(stats)
}

/// Mix the program audio covering `range` into a raw `f32le` file.
pub fn write_range_mix(program: &Program, range: FrameRange, path: &Path) -> SpotDiffResult<()> {
    let start = program.fps.frames_to_secs(range.start.0);
    let end = program.fps.frames_to_secs(range.end.0);
    let mixed = mix_placements(&program.audio, end, MIX_SAMPLE_RATE, MIX_CHANNELS);
    let skip = (secs_to_samples(start, MIX_SAMPLE_RATE) as usize) * usize::from(MIX_CHANNELS);
    let samples = mixed.interleaved_f32.get(skip..).unwrap_or(&[]);
    tracing::debug!(
        placements = program.audio.len(),
        seconds = end - start,
        "audio mixed"
    );
    write_f32le_file(samples, path)
}

fn temp_audio_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "spotdiff_audio_mix_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

fn build_thread_pool(threads: Option<usize>) -> SpotDiffResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpotDiffError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SpotDiffError::render(format!("failed to build rayon thread pool: {e}")))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
