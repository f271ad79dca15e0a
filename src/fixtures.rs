//! Placeholder asset library for local runs and smoke tests.
//!
//! Panels and the sample job are drawn in-process. Videos and audio cues are produced with the
//! system `ffmpeg`. Files that already exist are never overwritten.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use vello_cpu::kurbo::{Circle, Rect, RoundedRect};

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, Rgba8};
use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::job::model::{DiffPoint, Job, PointSpace, Question, Timing};
use crate::media::decode::PreparedImage;
use crate::media::library;
use crate::overlay::raster::{DigitStyle, fill_digits, fill_shape, rasterize, set_color, stroke_shape};
use crate::render::frame::FrameRGBA;
use crate::timeline::program::{CANVAS, FPS};
use crate::timeline::scene::{ALARM_KEY, COUNT10_KEY, PANEL_HEIGHT, PANEL_WIDTH};

pub const SAMPLE_JOB: &str = "job.json";

const PANEL_BG: Rgba8 = Rgba8::rgb(240, 240, 240);
const PANEL_INK: Rgba8 = Rgba8::rgb(30, 30, 30);
const SPOT_RADIUS: f64 = 24.0;
const SPOT_COLORS: [Rgba8; 3] = [
    Rgba8::rgb(255, 0, 0),
    Rgba8::rgb(0, 0, 255),
    Rgba8::rgb(0, 128, 0),
];

/// Left/right spot centers per puzzle.
const PUZZLES: [[((f64, f64), (f64, f64)); 3]; 3] = [
    [
        ((250.0, 230.0), (280.0, 250.0)),
        ((400.0, 420.0), (420.0, 430.0)),
        ((700.0, 540.0), (740.0, 560.0)),
    ],
    [
        ((200.0, 210.0), (220.0, 220.0)),
        ((470.0, 410.0), (500.0, 430.0)),
        ((650.0, 500.0), (690.0, 530.0)),
    ],
    [
        ((210.0, 240.0), (240.0, 260.0)),
        ((420.0, 340.0), (450.0, 370.0)),
        ((760.0, 550.0), (790.0, 570.0)),
    ],
];

const COUNT10_SIZE: (u32, u32) = (300, 220);

/// Which fixture files were created and which already existed.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FixtureReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

impl FixtureReport {
    fn record(&mut self, name: &str, wrote: bool) {
        if wrote {
            self.written.push(name.to_string());
        } else {
            self.skipped.push(name.to_string());
        }
    }
}

/// Write the whole placeholder library into `out`.
#[tracing::instrument]
pub fn generate_fixtures(out: &Path) -> SpotDiffResult<FixtureReport> {
    let mut report = FixtureReport::default();
    write_panel_fixtures(out, &mut report)?;
    write_sample_job(out, &mut report)?;
    write_media_fixtures(out, &mut report)?;
    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "fixtures ready"
    );
    Ok(report)
}

/// File name of a fixture panel, `side` being `Left` or `Right`.
pub fn panel_name(question: usize, side: &str) -> String {
    format!("Q{question}_Level{question}_{side}.png")
}

/// Puzzle panels: light board, dark frame, level digit and three colored spots.
pub fn write_panel_fixtures(out: &Path, report: &mut FixtureReport) -> SpotDiffResult<()> {
    create_dir(out)?;
    for (i, puzzle) in PUZZLES.iter().enumerate() {
        let n = i + 1;
        for (side, right) in [("Left", false), ("Right", true)] {
            let name = panel_name(n, side);
            let path = out.join(&name);
            if path.exists() {
                report.record(&name, false);
                continue;
            }
            let centers: Vec<(f64, f64)> = puzzle
                .iter()
                .map(|(l, r)| if right { *r } else { *l })
                .collect();
            write_png(&path, &draw_panel(n, &centers)?)?;
            report.record(&name, true);
        }
    }
    Ok(())
}

fn draw_panel(level: usize, centers: &[(f64, f64)]) -> SpotDiffResult<PreparedImage> {
    let (w, h) = (f64::from(PANEL_WIDTH), f64::from(PANEL_HEIGHT));
    rasterize(PANEL_WIDTH, PANEL_HEIGHT, |ctx| {
        set_color(ctx, PANEL_BG);
        fill_shape(ctx, &Rect::new(0.0, 0.0, w, h));
        set_color(ctx, PANEL_INK);
        stroke_shape(ctx, &Rect::new(2.0, 2.0, w - 2.0, h - 2.0), 4.0);
        fill_digits(
            ctx,
            &level.to_string(),
            30.0,
            20.0,
            DigitStyle {
                width: 24.0,
                height: 44.0,
                thickness: 6.0,
                gap: 6.0,
            },
        );
        for (&(x, y), color) in centers.iter().zip(SPOT_COLORS) {
            set_color(ctx, color);
            fill_shape(ctx, &Circle::new((x, y), SPOT_RADIUS));
        }
    })
}

/// The job matching the fixture panels.
pub fn sample_job() -> Job {
    let questions = PUZZLES
        .iter()
        .enumerate()
        .map(|(i, puzzle)| Question {
            left_image: panel_name(i + 1, "Left"),
            right_image: panel_name(i + 1, "Right"),
            diff_points: puzzle
                .iter()
                .map(|&((left_x, left_y), (right_x, right_y))| DiffPoint {
                    left_x,
                    left_y,
                    right_x,
                    right_y,
                    radius: 36.0,
                })
                .collect(),
        })
        .collect();
    Job {
        questions,
        random_seed: 42,
        timing: Timing::default(),
        bgm_volume: 0.35,
        point_space: PointSpace::Panel,
    }
}

pub fn write_sample_job(out: &Path, report: &mut FixtureReport) -> SpotDiffResult<()> {
    create_dir(out)?;
    let path = out.join(SAMPLE_JOB);
    if path.exists() {
        report.record(SAMPLE_JOB, false);
        return Ok(());
    }
    let json = serde_json::to_string_pretty(&sample_job())
        .map_err(|e| SpotDiffError::serde(format!("serialize sample job: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| SpotDiffError::media(format!("write '{}': {e}", path.display())))?;
    report.record(SAMPLE_JOB, true);
    Ok(())
}

/// Bumpers, backgrounds, keyed inserts and audio cues. Needs `ffmpeg`.
pub fn write_media_fixtures(out: &Path, report: &mut FixtureReport) -> SpotDiffResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(SpotDiffError::media(
            "ffmpeg is required to generate video and audio fixtures",
        ));
    }
    create_dir(out)?;

    let mut solids: Vec<(String, f64, Rgba8)> = vec![
        (library::OPENING.to_string(), 3.0, Rgba8::rgb(20, 80, 120)),
        (library::ENDING.to_string(), 3.0, Rgba8::rgb(120, 50, 20)),
    ];
    for i in 1..=3u8 {
        solids.push((
            library::question_bumper(usize::from(i)),
            4.0,
            Rgba8::rgb(30 + i * 20, 30, 60 + i * 20),
        ));
    }
    for i in 1..=11u8 {
        solids.push((
            format!("{}{i}.{}", library::BACKGROUND_PREFIX, library::BACKGROUND_EXT),
            6.0,
            Rgba8::rgb(10 + i * 12, 20 + i * 7, 25 + i * 5),
        ));
    }
    for (name, secs, color) in &solids {
        let wrote = if_missing(out, name, |path| solid_video(path, *secs, *color))?;
        report.record(name, wrote);
    }

    let wrote = if_missing(out, library::COUNT10, count10_video)?;
    report.record(library::COUNT10, wrote);
    let wrote = if_missing(out, library::ALARM, alarm_video)?;
    report.record(library::ALARM, wrote);

    let tones: [(String, f64, u32, f64); 9] = [
        (library::MAIN_BGM.to_string(), 400.0, 220, 0.06),
        (library::DESCRIPTION.to_string(), 3.0, 520, 0.18),
        (library::CUE_60S.to_string(), 1.0, 740, 0.18),
        (library::CUE_30S.to_string(), 1.0, 900, 0.18),
        (library::ANSWER.to_string(), 2.0, 440, 0.18),
        (library::answer_callout(1), 1.5, 500, 0.18),
        (library::answer_callout(2), 1.5, 600, 0.18),
        (library::answer_callout(3), 1.5, 700, 0.18),
        (library::CHEER.to_string(), 2.0, 880, 0.18),
    ];
    for (name, secs, freq, volume) in &tones {
        let wrote = if_missing(out, name, |path| tone(path, *secs, *freq, *volume))?;
        report.record(name, wrote);
    }
    Ok(())
}

fn if_missing(
    out: &Path,
    name: &str,
    make: impl FnOnce(&Path) -> SpotDiffResult<()>,
) -> SpotDiffResult<bool> {
    let path = out.join(name);
    if path.exists() {
        return Ok(false);
    }
    tracing::debug!(file = name, "writing fixture");
    make(&path)?;
    Ok(true)
}

fn solid_video(path: &Path, secs: f64, color: Rgba8) -> SpotDiffResult<()> {
    let src = format!(
        "color=c=0x{:02x}{:02x}{:02x}:s={}x{}:r={}:d={secs}",
        color.r, color.g, color.b, CANVAS.width, CANVAS.height, FPS.num
    );
    run_ffmpeg(
        Command::new("ffmpeg")
            .args(["-y", "-loglevel", "error", "-f", "lavfi", "-i", &src])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-an"])
            .arg(path),
        path,
    )
}

fn tone(path: &Path, secs: f64, freq: u32, volume: f64) -> SpotDiffResult<()> {
    let src = format!("sine=frequency={freq}:duration={secs}:sample_rate=44100");
    run_ffmpeg(
        Command::new("ffmpeg")
            .args(["-y", "-loglevel", "error", "-f", "lavfi", "-i", &src])
            .args(["-af", &format!("volume={volume}"), "-ac", "2"])
            .arg(path),
        path,
    )
}

fn run_ffmpeg(cmd: &mut Command, path: &Path) -> SpotDiffResult<()> {
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SpotDiffError::media(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(SpotDiffError::media(format!(
            "ffmpeg failed to write '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

/// Ten seconds of white numerals counting down on the green key color.
fn count10_video(path: &Path) -> SpotDiffResult<()> {
    let (w, h) = COUNT10_SIZE;
    let style = DigitStyle {
        width: 60.0,
        height: 120.0,
        thickness: 16.0,
        gap: 16.0,
    };
    let frames_per_digit = u64::from(FPS.num);
    encode_frames(path, Canvas { width: w, height: h }, 10 * frames_per_digit, |f| {
        let label = (10 - f / frames_per_digit).to_string();
        let x = ((f64::from(w) - style.text_width(&label)) / 2.0).round();
        let y = ((f64::from(h) - style.height) / 2.0).round();
        rasterize(w, h, |ctx| {
            set_color(ctx, COUNT10_KEY);
            fill_shape(ctx, &Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
            set_color(ctx, Rgba8::rgb(255, 255, 255));
            fill_digits(ctx, &label, x, y, style);
        })
    })
}

/// A red flash card on the blue key color, two seconds.
fn alarm_video(path: &Path) -> SpotDiffResult<()> {
    let (w, h) = (f64::from(CANVAS.width), f64::from(CANVAS.height));
    let card = rasterize(CANVAS.width, CANVAS.height, |ctx| {
        set_color(ctx, ALARM_KEY);
        fill_shape(ctx, &Rect::new(0.0, 0.0, w, h));
        set_color(ctx, Rgba8::rgb(170, 20, 20));
        fill_shape(ctx, &RoundedRect::new(w * 0.25, h * 0.3, w * 0.75, h * 0.7, 40.0));
    })?;
    encode_frames(path, CANVAS, 2 * u64::from(FPS.num), |_| Ok(card.clone()))
}

fn encode_frames(
    path: &Path,
    canvas: Canvas,
    frames: u64,
    mut draw: impl FnMut(u64) -> SpotDiffResult<PreparedImage>,
) -> SpotDiffResult<()> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(PathBuf::from(path)));
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: FPS,
        total_frames: frames,
        audio: None,
    })?;
    for f in 0..frames {
        let img = draw(f)?;
        let frame = FrameRGBA {
            width: img.width,
            height: img.height,
            data: img.rgba8_premul.to_vec(),
        };
        sink.push_frame(FrameIndex(f), &frame)?;
    }
    sink.end()
}

fn write_png(path: &Path, img: &PreparedImage) -> SpotDiffResult<()> {
    // opaque, so premultiplied equals straight alpha
    let buf = image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.to_vec())
        .ok_or_else(|| SpotDiffError::render("panel buffer size mismatch"))?;
    buf.save(path)
        .map_err(|e| SpotDiffError::media(format!("write '{}': {e}", path.display())))
}

fn create_dir(out: &Path) -> SpotDiffResult<()> {
    std::fs::create_dir_all(out)
        .map_err(|e| SpotDiffError::media(format!("create '{}': {e}", out.display())))
}

#[cfg(test)]
#[path = "../tests/unit/fixtures.rs"]
mod tests;
