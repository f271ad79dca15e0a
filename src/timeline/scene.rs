//! Scene Timeline Compositor.
//!
//! [`build_scene`] lays out one question: bumper, looped background, sliding panels, countdown
//! graphics, keyed inserts, reveal markers and the full cue audio, each at a deterministic time.

use std::sync::Arc;

use crate::animation::ease::{Ease, Tween};
use crate::effects::chroma::ChromaKey;
use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::SpotDiffResult;
use crate::job::model::{PointSpace, Question, Timing};
use crate::media::clip::{AudioClip, VideoClip, VideoSource, loop_to_duration};
use crate::media::decode::{ImageFit, PreparedImage};
use crate::media::library::{self, answer_callout, question_bumper};
use crate::media::resolve::{
    ALARM_FALLBACK_SECS, ANSWER_FALLBACK_SECS, BACKGROUND_FALLBACK_SECS,
    BACKGROUND_PLACEHOLDER_COLOR, CALLOUT_FALLBACK_SECS, CHEER_FALLBACK_SECS,
    COUNT10_FALLBACK_SECS, DESCRIPTION_FALLBACK_SECS, Fallback, MediaClip, MediaKind,
    MediaResolver, PANEL_PLACEHOLDER_COLOR, QUESTION_BUMPER_FALLBACK_SECS,
    TIME_CUE_FALLBACK_SECS,
};
use crate::overlay::countdown::CountdownBadge;
use crate::overlay::generator::OverlayGenerator;
use crate::overlay::markers::DiffMarker;
use crate::timeline::background::BackgroundPicker;
use crate::timeline::schedule::{CueDurations, SceneSchedule};

pub const PANEL_WIDTH: u32 = 930;
pub const PANEL_HEIGHT: u32 = 780;
pub const LEFT_PANEL_AT: (f64, f64) = (20.0, 150.0);
pub const RIGHT_PANEL_AT: (f64, f64) = (970.0, 150.0);
pub const SLIDE_IN_SECS: f64 = 0.8;
pub const TITLE_WIDTH: u32 = 880;
pub const COUNT10_HEIGHT: u32 = 170;
/// Count10 insert position measured from the top-right corner.
pub const COUNT10_INSET: (i64, i64) = (230, 16);
pub const COUNT10_KEY: Rgba8 = Rgba8::rgb(0, 255, 0);
pub const ALARM_KEY: Rgba8 = Rgba8::rgb(0, 0, 255);

/// Where a layer's top-left corner sits over time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Placement {
    pub x: Tween,
    pub y: f64,
}

impl Placement {
    /// A placement that never moves.
    pub fn fixed(x: f64, y: f64) -> Self {
        Self {
            x: Tween {
                from: x,
                to: x,
                start: 0.0,
                duration: 0.0,
                ease: Ease::Linear,
            },
            y,
        }
    }

    /// Integer pixel offset at layer-local time `t`.
    pub fn sample(&self, t: f64) -> (i64, i64) {
        (self.x.sample(t).round() as i64, self.y.round() as i64)
    }
}

/// What a video layer draws.
#[derive(Clone, Debug)]
pub enum LayerContent {
    /// Edit-list video scaled to the layer size, optionally chroma keyed.
    Clip {
        clip: VideoClip,
        key: Option<ChromaKey>,
    },
    Still(Arc<PreparedImage>),
    Procedural(Arc<dyn OverlayGenerator>),
}

/// One timed visual element. Times are relative to the owning segment.
#[derive(Clone, Debug)]
pub struct VideoLayer {
    pub name: String,
    pub start: f64,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub placement: Placement,
    pub content: LayerContent,
}

impl VideoLayer {
    /// Scene-local end time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Layer-local time when `t` falls inside `[start, end)`.
    pub fn local_time(&self, t: f64) -> Option<f64> {
        (t >= self.start && t < self.end()).then(|| t - self.start)
    }
}

/// One timed audio element, mixed additively.
#[derive(Clone, Debug)]
pub struct AudioPlacement {
    pub name: String,
    pub start: f64,
    pub clip: AudioClip,
    pub gain: f32,
    /// Hard stop: nothing past this time is mixed.
    pub until: f64,
}

impl AudioPlacement {
    fn new(name: impl Into<String>, start: f64, clip: AudioClip, until: f64) -> Self {
        Self {
            name: name.into(),
            start,
            clip,
            gain: 1.0,
            until,
        }
    }

    /// Same placement moved by `offset` seconds.
    pub fn shifted(mut self, offset: f64) -> Self {
        self.start += offset;
        self.until += offset;
        self
    }
}

/// A question's intro bumper.
#[derive(Clone, Debug)]
pub struct Bumper {
    pub name: String,
    pub layer: VideoLayer,
    pub audio: Option<AudioPlacement>,
    pub duration: f64,
}

/// One question's laid-out timeline: `[bumper] + [scene]`.
#[derive(Clone, Debug)]
pub struct Scene {
    /// 1-based question number.
    pub index: usize,
    pub background: Option<String>,
    pub schedule: SceneSchedule,
    pub bumper: Bumper,
    /// Scene layers, bottom to top. Times are relative to the scene start (after the bumper).
    pub layers: Vec<VideoLayer>,
    pub audio: Vec<AudioPlacement>,
    /// Start time of each revealed marker, in reveal order.
    pub marker_starts: Vec<f64>,
}

impl Scene {
    /// `bumper + scene_duration`, the length of both the video and the audio track.
    pub fn total_duration(&self) -> f64 {
        self.bumper.duration + self.schedule.scene_duration
    }
}

/// Resolve a bumper clip as a full-canvas layer plus its native audio.
pub fn bumper(
    resolver: &mut MediaResolver,
    rel: &str,
    fallback_secs: f64,
) -> SpotDiffResult<Bumper> {
    let media = resolver.video(rel, fallback_secs)?;
    let canvas = resolver.canvas();
    let duration = media.duration;
    let video = media_video(&media, canvas);
    let audio = media
        .audio
        .map(|clip| AudioPlacement::new(rel, 0.0, clip, duration));
    Ok(Bumper {
        name: rel.to_string(),
        layer: VideoLayer {
            name: rel.to_string(),
            start: 0.0,
            duration,
            width: canvas.width,
            height: canvas.height,
            placement: Placement::fixed(0.0, 0.0),
            content: LayerContent::Clip {
                clip: video,
                key: None,
            },
        },
        audio,
        duration,
    })
}

/// Factors taking source-image pixels to the resized panel. Missing images are panel-sized.
fn panel_scale(native: Option<(u32, u32)>) -> (f64, f64) {
    match native {
        Some((w, h)) if w > 0 && h > 0 => (
            f64::from(PANEL_WIDTH) / f64::from(w),
            f64::from(PANEL_HEIGHT) / f64::from(h),
        ),
        _ => (1.0, 1.0),
    }
}

fn panel_to_canvas(x: f64, y: f64, scale: (f64, f64), at: (f64, f64)) -> Point {
    Point::new(x * scale.0 + at.0, y * scale.1 + at.1)
}

/// Lay out question `index` (1-based).
#[tracing::instrument(skip(question, resolver, picker, timing), fields(left = %question.left_image))]
pub fn build_scene(
    index: usize,
    question: &Question,
    resolver: &mut MediaResolver,
    picker: &mut BackgroundPicker,
    timing: &Timing,
    point_space: PointSpace,
) -> SpotDiffResult<Scene> {
    let canvas = resolver.canvas();
    let bumper = bumper(resolver, &question_bumper(index), QUESTION_BUMPER_FALLBACK_SECS)?;

    let candidates = resolver.library().background_candidates();
    let background = picker.pick(&candidates);
    let bg_media = match &background {
        Some(name) => resolver.video(name, BACKGROUND_FALLBACK_SECS)?,
        None => resolver.resolve(
            "<background>",
            MediaKind::Video,
            Fallback::new(BACKGROUND_FALLBACK_SECS).with_color(BACKGROUND_PLACEHOLDER_COLOR),
        )?,
    };
    tracing::info!(
        question = index,
        background = background.as_deref().unwrap_or("<solid>"),
        "background chosen"
    );

    let description = resolver.audio(library::DESCRIPTION, DESCRIPTION_FALLBACK_SECS)?;
    let cue60 = resolver.audio(library::CUE_60S, TIME_CUE_FALLBACK_SECS)?;
    let cue30 = resolver.audio(library::CUE_30S, TIME_CUE_FALLBACK_SECS)?;
    let answer = resolver.audio(library::ANSWER, ANSWER_FALLBACK_SECS)?;
    let callouts = [
        resolver.audio(&answer_callout(1), CALLOUT_FALLBACK_SECS)?,
        resolver.audio(&answer_callout(2), CALLOUT_FALLBACK_SECS)?,
        resolver.audio(&answer_callout(3), CALLOUT_FALLBACK_SECS)?,
    ];
    let cheer = resolver.audio(library::CHEER, CHEER_FALLBACK_SECS)?;
    let count10 = resolver.video(library::COUNT10, COUNT10_FALLBACK_SECS)?;
    let alarm = resolver.video(library::ALARM, ALARM_FALLBACK_SECS)?;

    let schedule = SceneSchedule::compute(
        timing,
        &CueDurations {
            alarm: alarm.duration,
            answer: answer.duration,
            answers: [
                callouts[0].duration,
                callouts[1].duration,
                callouts[2].duration,
            ],
            cheer: cheer.duration,
        },
    )?;
    let s = schedule;
    let scene_end = s.scene_duration;

    let mut layers = Vec::new();

    let bg_video = media_video(&bg_media, canvas);
    layers.push(VideoLayer {
        name: background.clone().unwrap_or_else(|| "background".to_string()),
        start: 0.0,
        duration: scene_end,
        width: canvas.width,
        height: canvas.height,
        placement: Placement::fixed(0.0, 0.0),
        content: LayerContent::Clip {
            clip: loop_to_duration(&bg_video, scene_end)?,
            key: None,
        },
    });

    let left = resolver.image_or_solid(
        &question.left_image,
        PANEL_WIDTH,
        PANEL_HEIGHT,
        PANEL_PLACEHOLDER_COLOR,
    )?;
    let right = resolver.image_or_solid(
        &question.right_image,
        PANEL_WIDTH,
        PANEL_HEIGHT,
        PANEL_PLACEHOLDER_COLOR,
    )?;
    let left_off = -(f64::from(PANEL_WIDTH) - 1.0);
    let right_off = f64::from(canvas.width) - 1.0;
    layers.push(slide_in(
        "left_image",
        left,
        s.image_start,
        scene_end,
        left_off,
        LEFT_PANEL_AT,
    ));
    layers.push(slide_in(
        "right_image",
        right,
        s.image_start,
        scene_end,
        right_off,
        RIGHT_PANEL_AT,
    ));

    if let Some(title) = resolver.image(library::QUESTION_TITLE, ImageFit::Width(TITLE_WIDTH))? {
        let x = ((i64::from(canvas.width) - i64::from(title.width)) / 2) as f64;
        layers.push(VideoLayer {
            name: library::QUESTION_TITLE.to_string(),
            start: s.countdown_start,
            duration: s.countdown_duration,
            width: title.width,
            height: title.height,
            placement: Placement::fixed(x, 0.0),
            content: LayerContent::Still(title),
        });
    }

    let badge_span = s.count10_start - s.countdown_start;
    if badge_span > 0.0 {
        let badge = CountdownBadge::new(timing.countdown_seconds.round() as u32, canvas.width);
        layers.push(procedural(
            "countdown_badge",
            s.countdown_start,
            badge_span,
            Arc::new(badge),
        ));
    }

    if let Some(clip) = count10.video.clone() {
        let (src_w, src_h) = clip.dimensions().unwrap_or((canvas.width, canvas.height));
        let (width, height) = fit_height(src_w, src_h, COUNT10_HEIGHT);
        layers.push(VideoLayer {
            name: library::COUNT10.to_string(),
            start: s.count10_start,
            duration: count10.duration.min(scene_end - s.count10_start),
            width,
            height,
            placement: Placement::fixed(
                (i64::from(canvas.width) - COUNT10_INSET.0) as f64,
                COUNT10_INSET.1 as f64,
            ),
            content: LayerContent::Clip {
                clip,
                key: Some(ChromaKey::new(COUNT10_KEY, timing.count10_chroma_threshold)),
            },
        });
    }

    let (left_scale, right_scale) = match point_space {
        PointSpace::Canvas => ((1.0, 1.0), (1.0, 1.0)),
        PointSpace::Panel => (
            panel_scale(resolver.image_size(&question.left_image)?),
            panel_scale(resolver.image_size(&question.right_image)?),
        ),
    };
    let mut marker_starts = Vec::new();
    for (i, p) in question.revealed_points().iter().enumerate() {
        let Some(start) = s.reveal_start(i) else {
            break;
        };
        let (left_c, right_c) = match point_space {
            PointSpace::Canvas => (
                Point::new(p.left_x, p.left_y),
                Point::new(p.right_x, p.right_y),
            ),
            PointSpace::Panel => (
                panel_to_canvas(p.left_x, p.left_y, left_scale, LEFT_PANEL_AT),
                panel_to_canvas(p.right_x, p.right_y, right_scale, RIGHT_PANEL_AT),
            ),
        };
        let marker = DiffMarker::for_reveal(i, vec![left_c, right_c], p.radius);
        layers.push(procedural(
            format!("marker{}", i + 1),
            start,
            scene_end - start,
            Arc::new(marker),
        ));
        marker_starts.push(start);
    }

    if let Some(clip) = alarm.video.clone() {
        layers.push(VideoLayer {
            name: library::ALARM.to_string(),
            start: s.alarm_start,
            duration: alarm.duration.min(scene_end - s.alarm_start),
            width: canvas.width,
            height: canvas.height,
            placement: Placement::fixed(0.0, 0.0),
            content: LayerContent::Clip {
                clip,
                key: Some(ChromaKey::new(ALARM_KEY, timing.alarm_chroma_threshold)),
            },
        });
    }

    let mut audio = Vec::new();
    let mut cue = |name: &str, start: f64, media: &MediaClip| {
        if let Some(clip) = media.audio.clone() {
            audio.push(AudioPlacement::new(name, start, clip, scene_end));
        }
    };
    cue(library::DESCRIPTION, s.image_start, &description);
    cue(library::CUE_60S, s.cue_60s_start, &cue60);
    cue(library::CUE_30S, s.cue_30s_start, &cue30);
    cue(library::ANSWER, s.answer_start, &answer);
    for (i, callout) in callouts.iter().enumerate() {
        let start = s.reveal_start(i).unwrap_or(s.answer3_start);
        cue(&answer_callout(i + 1), start, callout);
    }
    cue(library::CHEER, s.cheer_start, &cheer);
    cue(library::COUNT10, s.count10_start, &count10);
    cue(library::ALARM, s.alarm_start, &alarm);

    tracing::debug!(
        question = index,
        scene_duration = scene_end,
        layers = layers.len(),
        audio = audio.len(),
        "scene laid out"
    );

    Ok(Scene {
        index,
        background,
        schedule,
        bumper,
        layers,
        audio,
        marker_starts,
    })
}

/// Video track of `media`, or a canvas-sized placeholder when it only has audio.
fn media_video(media: &MediaClip, canvas: Canvas) -> VideoClip {
    match &media.video {
        Some(v) => v.clone(),
        None => VideoClip::from_source(
            VideoSource::Solid {
                color: crate::media::resolve::PLACEHOLDER_COLOR,
                width: canvas.width,
                height: canvas.height,
            },
            media.duration,
        ),
    }
}

/// Size of a `src_w`x`src_h` frame scaled to `height`, preserving aspect ratio.
fn fit_height(src_w: u32, src_h: u32, height: u32) -> (u32, u32) {
    if src_h == 0 {
        return (src_w.max(1), height);
    }
    let width = (f64::from(src_w) * f64::from(height) / f64::from(src_h)).round() as u32;
    (width.max(1), height)
}

fn slide_in(
    name: &str,
    image: Arc<PreparedImage>,
    start: f64,
    scene_end: f64,
    off_x: f64,
    target: (f64, f64),
) -> VideoLayer {
    VideoLayer {
        name: name.to_string(),
        start,
        duration: (scene_end - start).max(0.0),
        width: image.width,
        height: image.height,
        placement: Placement {
            x: Tween {
                from: off_x,
                to: target.0,
                start: 0.0,
                duration: SLIDE_IN_SECS,
                ease: Ease::OutQuad,
            },
            y: target.1,
        },
        content: LayerContent::Still(image),
    }
}

fn procedural(
    name: impl Into<String>,
    start: f64,
    duration: f64,
    generator: Arc<dyn OverlayGenerator>,
) -> VideoLayer {
    let b = generator.bounds();
    VideoLayer {
        name: name.into(),
        start,
        duration,
        width: b.width,
        height: b.height,
        placement: Placement::fixed(b.x as f64, b.y as f64),
        content: LayerContent::Procedural(generator),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scene.rs"]
mod tests;
