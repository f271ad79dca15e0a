//! Program Assembler: opening bumper, question blocks, closing bumper, background music.

use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::SpotDiffResult;
use crate::job::model::Job;
use crate::media::clip::loop_to_duration;
use crate::media::library;
use crate::media::resolve::{BGM_FALLBACK_SECS, BUMPER_FALLBACK_SECS, MediaResolver};
use crate::timeline::background::BackgroundPicker;
use crate::timeline::scene::{AudioPlacement, Bumper, VideoLayer, build_scene, bumper};
use crate::timeline::schedule::SceneSchedule;

pub const CANVAS: Canvas = Canvas {
    width: 1920,
    height: 1080,
};
pub const FPS: Fps = Fps { num: 30, den: 1 };

const FINGERPRINT_SEED: u64 = 0x5b07_d1ff_9e3a_41c7;

/// A contiguous stretch of the program with its own layer stack.
#[derive(Clone, Debug)]
pub struct ProgramSegment {
    pub name: String,
    /// Absolute start in seconds.
    pub start: f64,
    pub duration: f64,
    /// Bottom to top; layer times are relative to `start`.
    pub layers: Vec<VideoLayer>,
}

impl ProgramSegment {
    /// Program time at which the segment ends.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Where one question landed on the program timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct QuestionSummary {
    pub index: usize,
    pub background: Option<String>,
    pub bumper_start: f64,
    pub bumper_duration: f64,
    pub scene_start: f64,
    pub schedule: SceneSchedule,
    pub marker_starts: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProgramSummary {
    pub duration: f64,
    pub total_frames: u64,
    pub fingerprint: String,
    pub opening_duration: f64,
    pub question_block: (f64, f64),
    pub ending_duration: f64,
    pub questions: Vec<QuestionSummary>,
}

/// Fully laid-out program, ready to render.
#[derive(Clone, Debug)]
pub struct Program {
    pub canvas: Canvas,
    pub fps: Fps,
    pub segments: Vec<ProgramSegment>,
    /// Absolute-time audio placements.
    pub audio: Vec<AudioPlacement>,
    pub duration: f64,
    pub opening_duration: f64,
    pub ending_duration: f64,
    /// `[start, end)` of the question block the background music covers.
    pub question_block: (f64, f64),
    pub questions: Vec<QuestionSummary>,
}

impl Program {
    /// Frame count at [`FPS`], rounded to the nearest frame.
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_round(self.duration)
    }

    /// Segment live at absolute time `t`, with the segment-local time.
    pub fn segment_at(&self, t: f64) -> Option<(&ProgramSegment, f64)> {
        self.segments
            .iter()
            .find(|s| t >= s.start && t < s.end())
            .map(|s| (s, t - s.start))
    }

    /// Stable hash of the layout: segment, layer and audio names with their timing.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::with_seed(FINGERPRINT_SEED);
        for seg in &self.segments {
            h.update(seg.name.as_bytes());
            put_f64(&mut h, seg.start);
            put_f64(&mut h, seg.duration);
            for layer in &seg.layers {
                h.update(layer.name.as_bytes());
                put_f64(&mut h, layer.start);
                put_f64(&mut h, layer.duration);
                h.update(&layer.width.to_le_bytes());
                h.update(&layer.height.to_le_bytes());
            }
        }
        for a in &self.audio {
            h.update(a.name.as_bytes());
            put_f64(&mut h, a.start);
            put_f64(&mut h, a.until);
            h.update(&a.gain.to_bits().to_le_bytes());
        }
        h.digest()
    }

    /// Serializable view of every segment and question schedule.
    pub fn summary(&self) -> ProgramSummary {
        ProgramSummary {
            duration: self.duration,
            total_frames: self.total_frames(),
            fingerprint: format!("{:016x}", self.fingerprint()),
            opening_duration: self.opening_duration,
            question_block: self.question_block,
            ending_duration: self.ending_duration,
            questions: self.questions.clone(),
        }
    }
}

/// Lay out the whole program for `job`.
///
/// Questions are built in job order with one [`BackgroundPicker`] seeded from the job, so the
/// result is a pure function of the job and the asset directory contents.
#[tracing::instrument(skip_all, fields(questions = job.questions.len(), seed = job.random_seed))]
pub fn assemble_program(job: &Job, resolver: &mut MediaResolver) -> SpotDiffResult<Program> {
    let mut picker = BackgroundPicker::new(job.random_seed);
    let mut segments = Vec::new();
    let mut audio = Vec::new();
    let mut questions = Vec::new();

    let opening = bumper(resolver, library::OPENING, BUMPER_FALLBACK_SECS)?;
    let opening_duration = opening.duration;
    push_bumper(&mut segments, &mut audio, opening, 0.0);

    let mut cursor = opening_duration;
    let block_start = cursor;
    for (i, q) in job.questions.iter().enumerate() {
        let scene = build_scene(
            i + 1,
            q,
            resolver,
            &mut picker,
            &job.timing,
            job.point_space,
        )?;
        let bumper_start = cursor;
        let bumper_duration = scene.bumper.duration;
        let scene_start = bumper_start + bumper_duration;

        push_bumper(&mut segments, &mut audio, scene.bumper, bumper_start);
        segments.push(ProgramSegment {
            name: format!("scene{}", scene.index),
            start: scene_start,
            duration: scene.schedule.scene_duration,
            layers: scene.layers,
        });
        audio.extend(scene.audio.into_iter().map(|a| a.shifted(scene_start)));

        questions.push(QuestionSummary {
            index: scene.index,
            background: scene.background,
            bumper_start,
            bumper_duration,
            scene_start,
            schedule: scene.schedule,
            marker_starts: scene.marker_starts,
        });
        cursor = scene_start + scene.schedule.scene_duration;
    }
    let block_end = cursor;

    let bgm = resolver.audio(library::MAIN_BGM, BGM_FALLBACK_SECS)?;
    let block_len = block_end - block_start;
    if let Some(clip) = bgm.audio
        && block_len > 0.0
    {
        audio.push(AudioPlacement {
            name: library::MAIN_BGM.to_string(),
            start: block_start,
            clip: loop_to_duration(&clip, block_len)?,
            gain: job.bgm_volume as f32,
            until: block_end,
        });
    }

    let ending = bumper(resolver, library::ENDING, BUMPER_FALLBACK_SECS)?;
    let ending_duration = ending.duration;
    push_bumper(&mut segments, &mut audio, ending, block_end);
    let duration = block_end + ending_duration;

    tracing::info!(
        duration,
        segments = segments.len(),
        audio = audio.len(),
        "program assembled"
    );

    Ok(Program {
        canvas: resolver.canvas(),
        fps: FPS,
        segments,
        audio,
        duration,
        opening_duration,
        ending_duration,
        question_block: (block_start, block_end),
        questions,
    })
}

fn put_f64(h: &mut Xxh3, v: f64) {
    h.update(&v.to_bits().to_le_bytes());
}

fn push_bumper(
    segments: &mut Vec<ProgramSegment>,
    audio: &mut Vec<AudioPlacement>,
    bumper: Bumper,
    start: f64,
) {
    segments.push(ProgramSegment {
        name: bumper.name,
        start,
        duration: bumper.duration,
        layers: vec![bumper.layer],
    });
    if let Some(a) = bumper.audio {
        audio.push(a.shifted(start));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/program.rs"]
mod tests;
