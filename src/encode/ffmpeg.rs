use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Color under transparent pixels.
    pub flatten: Rgba8,
    /// libx264 preset.
    pub preset: String,
    /// Encoder thread count; 0 lets ffmpeg decide.
    pub threads: u32,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            flatten: Rgba8::rgb(0, 0, 0),
            preset: "medium".to_string(),
            threads: 4,
        }
    }
}

/// Streams opaque RGBA frames into a system `ffmpeg` producing H.264/AAC MP4.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    pushed: u64,
}

impl FfmpegSink {
    /// Create a sink. ffmpeg is spawned in [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            pushed: 0,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> SpotDiffResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);

        match cfg.audio.as_ref() {
            Some(audio) => {
                if audio.sample_rate == 0 || audio.channels == 0 {
                    return Err(SpotDiffError::validation(
                        "audio sample_rate and channels must be non-zero",
                    ));
                }
                cmd.args([
                    "-f",
                    "f32le",
                    "-ar",
                    &audio.sample_rate.to_string(),
                    "-ac",
                    &audio.channels.to_string(),
                    "-i",
                ])
                .arg(&audio.path)
                .args(["-c:a", "aac", "-shortest"]);
            }
            None => {
                cmd.arg("-an");
            }
        }

        cmd.args([
            "-c:v",
            "libx264",
            "-preset",
            &self.opts.preset,
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        if self.opts.threads > 0 {
            cmd.args(["-threads", &self.opts.threads.to_string()]);
        }
        cmd.arg(&self.opts.out_path);
        Ok(cmd)
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SpotDiffResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SpotDiffError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SpotDiffError::validation(
                "ffmpeg sink width/height must be even for yuv420p output",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SpotDiffError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(SpotDiffError::render(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg)?.spawn().map_err(|e| {
            SpotDiffError::render(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SpotDiffError::render("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SpotDiffError::render("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::info!(
            out = %self.opts.out_path.display(),
            frames = cfg.total_frames,
            audio = cfg.audio.is_some(),
            "ffmpeg encoder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.pushed = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SpotDiffResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SpotDiffError::render("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SpotDiffError::render(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SpotDiffError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(idx);

        flatten_to_opaque(&mut self.scratch, &frame.data, self.opts.flatten)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SpotDiffError::render("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            SpotDiffError::render(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        self.pushed += 1;
        let per_sec = cfg.fps.as_f64().round().max(1.0) as u64;
        if self.pushed.is_multiple_of(per_sec) {
            tracing::info!(
                frame = self.pushed,
                total = cfg.total_frames,
                "encoded {}s",
                self.pushed / per_sec
            );
        }
        Ok(())
    }

    fn end(&mut self) -> SpotDiffResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SpotDiffError::render("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| SpotDiffError::render(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SpotDiffError::render("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SpotDiffError::render(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            return Err(SpotDiffError::render(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }

        tracing::info!(frames = self.pushed, out = %self.opts.out_path.display(), "encode finished");
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Composite premultiplied `src` over an opaque `bg`, writing opaque RGBA8 into `dst`.
pub(crate) fn flatten_to_opaque(dst: &mut [u8], src_premul: &[u8], bg: Rgba8) -> SpotDiffResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(SpotDiffError::render(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    let (bg_r, bg_g, bg_b) = (u16::from(bg.r), u16::from(bg.g), u16::from(bg.b));

    dst.par_chunks_exact_mut(4)
        .zip(src_premul.par_chunks_exact(4))
        .for_each(|(d, s)| {
            let a = u16::from(s[3]);
            if a == 255 {
                d.copy_from_slice(s);
                return;
            }
            let inv = 255 - a;
            d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
            d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
            d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
            d[3] = 255;
        });
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SpotDiffResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
