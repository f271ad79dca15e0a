use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::job::model::Timing;
use crate::job::validate::validate_timing;

/// Pause after the last callout before the cheer, and after the cheer before the scene ends.
pub const CHEER_PAD_SECS: f64 = 2.0;
/// Length of the recorded final-ten-seconds insert window.
pub const COUNT10_WINDOW_SECS: f64 = 10.0;
pub const CUE_60S_LEAD: f64 = 60.0;
pub const CUE_30S_LEAD: f64 = 30.0;

/// Native durations of the cue media a schedule depends on.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CueDurations {
    pub alarm: f64,
    pub answer: f64,
    pub answers: [f64; 3],
    pub cheer: f64,
}

/// Every named time of one question scene, in seconds from the scene start.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SceneSchedule {
    pub image_start: f64,
    pub countdown_start: f64,
    pub countdown_duration: f64,
    pub after_countdown: f64,
    pub count10_start: f64,
    pub cue_60s_start: f64,
    pub cue_30s_start: f64,
    pub alarm_start: f64,
    pub answer_start: f64,
    pub answer1_start: f64,
    pub answer2_start: f64,
    pub answer3_start: f64,
    pub cheer_start: f64,
    pub scene_duration: f64,
}

impl SceneSchedule {
    /// Compute every named time of a scene from the timing knobs and cue lengths.
    pub fn compute(timing: &Timing, cues: &CueDurations) -> SpotDiffResult<Self> {
        validate_timing(timing)?;
        for (name, v) in [
            ("alarm", cues.alarm),
            ("answer", cues.answer),
            ("answer1", cues.answers[0]),
            ("answer2", cues.answers[1]),
            ("answer3", cues.answers[2]),
            ("cheer", cues.cheer),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SpotDiffError::validation(format!(
                    "{name} cue duration must be finite and >= 0 (got {v})"
                )));
            }
        }

        let image_start = timing.image_start_delay;
        let countdown_start = image_start;
        let countdown_duration = timing.countdown_seconds;
        let after_countdown = countdown_start + countdown_duration;
        let gap = timing.answer_gap_after_seconds;

        let alarm_start = after_countdown;
        let answer_start = alarm_start + cues.alarm;
        let answer1_start = answer_start + cues.answer;
        let answer2_start = answer1_start + cues.answers[0] + gap;
        let answer3_start = answer2_start + cues.answers[1] + gap;
        let cheer_start = answer3_start + cues.answers[2] + CHEER_PAD_SECS;
        let scene_duration = cheer_start + cues.cheer + CHEER_PAD_SECS;

        Ok(Self {
            image_start,
            countdown_start,
            countdown_duration,
            after_countdown,
            count10_start: countdown_start + (countdown_duration - COUNT10_WINDOW_SECS).max(0.0),
            cue_60s_start: countdown_start + (countdown_duration - CUE_60S_LEAD).max(0.0),
            cue_30s_start: countdown_start + (countdown_duration - CUE_30S_LEAD).max(0.0),
            alarm_start,
            answer_start,
            answer1_start,
            answer2_start,
            answer3_start,
            cheer_start,
            scene_duration,
        })
    }

    /// Reveal time of the `index`-th difference (0-based, at most 3).
    pub fn reveal_start(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.answer1_start),
            1 => Some(self.answer2_start),
            2 => Some(self.answer3_start),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
