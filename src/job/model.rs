use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SpotDiffError, SpotDiffResult};

/// Maximum number of difference points revealed per question.
pub const MAX_REVEALED_POINTS: usize = 3;

/// Top-level render request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Questions in presentation order.
    pub questions: Vec<Question>,
    /// Seed for background selection.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Per-job timing overrides.
    #[serde(default)]
    pub timing: Timing,
    /// Gain applied to the looped background music.
    #[serde(default = "default_bgm_volume")]
    pub bgm_volume: f64,
    /// Coordinate space of [`DiffPoint`] positions.
    #[serde(default)]
    pub point_space: PointSpace,
}

/// One puzzle round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Asset reference of the left panel image.
    pub left_image: String,
    /// Asset reference of the right panel image.
    pub right_image: String,
    /// Differences in reveal order. Only the first three are used.
    #[serde(default)]
    pub diff_points: Vec<DiffPoint>,
}

impl Question {
    /// Points that get a reveal marker, in reveal order.
    pub fn revealed_points(&self) -> &[DiffPoint] {
        let n = self.diff_points.len().min(MAX_REVEALED_POINTS);
        &self.diff_points[..n]
    }
}

/// One highlighted discrepancy between the two panels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffPoint {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
    pub right_y: f64,
    /// Marker radius in pixels.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

/// How diff point coordinates are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSpace {
    /// Absolute canvas coordinates.
    #[default]
    Canvas,
    /// Pixels of the source panel image, scaled to the panel size and offset by where the
    /// panel settles.
    Panel,
}

/// Named timing and keying knobs. Every field has a documented default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Delay before the panels slide in and the countdown starts (seconds).
    pub image_start_delay: f64,
    /// Total think time (seconds).
    pub countdown_seconds: f64,
    /// Pause between staggered answer reveals (seconds).
    pub answer_gap_after_seconds: f64,
    /// Color-distance tolerance when keying the count10 insert.
    pub count10_chroma_threshold: f64,
    /// Color-distance tolerance when keying the alarm flash.
    pub alarm_chroma_threshold: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            image_start_delay: 0.5,
            countdown_seconds: 90.0,
            answer_gap_after_seconds: 4.0,
            count10_chroma_threshold: 90.0,
            alarm_chroma_threshold: 90.0,
        }
    }
}

fn default_random_seed() -> u64 {
    42
}

fn default_bgm_volume() -> f64 {
    0.35
}

fn default_radius() -> f64 {
    36.0
}

impl Job {
    /// Parse a job from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> SpotDiffResult<Self> {
        let job: Job = serde_json::from_reader(r)
            .map_err(|e| SpotDiffError::validation(format!("parse job JSON: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    /// Parse a job from a JSON string and validate it.
    pub fn from_json_str(s: &str) -> SpotDiffResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a job from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> SpotDiffResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SpotDiffError::validation(format!("open job JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every invariant the compositor relies on.
    pub fn validate(&self) -> SpotDiffResult<()> {
        crate::job::validate::validate_job(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/model.rs"]
mod tests;
