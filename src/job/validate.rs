use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::job::model::{DiffPoint, Job, Timing};
use crate::media::library::normalize_rel_path;

pub(crate) fn validate_job(job: &Job) -> SpotDiffResult<()> {
    if job.questions.is_empty() {
        return Err(SpotDiffError::validation(
            "job must contain at least one question",
        ));
    }
    validate_timing(&job.timing)?;
    non_negative("bgm_volume", job.bgm_volume)?;

    for (i, q) in job.questions.iter().enumerate() {
        let n = i + 1;
        normalize_rel_path(&q.left_image)
            .map_err(|e| prefixed(format!("question {n}: left_image"), e))?;
        normalize_rel_path(&q.right_image)
            .map_err(|e| prefixed(format!("question {n}: right_image"), e))?;
        for (j, p) in q.diff_points.iter().enumerate() {
            validate_point(p).map_err(|e| prefixed(format!("question {n}: diff_points[{j}]"), e))?;
        }
    }
    Ok(())
}

pub(crate) fn validate_timing(t: &Timing) -> SpotDiffResult<()> {
    non_negative("timing.image_start_delay", t.image_start_delay)?;
    // zero would put the alarm on top of the countdown start
    if !t.countdown_seconds.is_finite() || t.countdown_seconds <= 0.0 {
        return Err(SpotDiffError::validation(format!(
            "timing.countdown_seconds must be finite and > 0 (got {})",
            t.countdown_seconds
        )));
    }
    non_negative("timing.answer_gap_after_seconds", t.answer_gap_after_seconds)?;
    non_negative("timing.count10_chroma_threshold", t.count10_chroma_threshold)?;
    non_negative("timing.alarm_chroma_threshold", t.alarm_chroma_threshold)?;
    Ok(())
}

fn validate_point(p: &DiffPoint) -> SpotDiffResult<()> {
    for (name, v) in [
        ("left_x", p.left_x),
        ("left_y", p.left_y),
        ("right_x", p.right_x),
        ("right_y", p.right_y),
    ] {
        if !v.is_finite() {
            return Err(SpotDiffError::validation(format!("{name} must be finite")));
        }
    }
    if !p.radius.is_finite() || p.radius <= 0.0 {
        return Err(SpotDiffError::validation("radius must be finite and > 0"));
    }
    Ok(())
}

fn non_negative(name: &str, v: f64) -> SpotDiffResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(SpotDiffError::validation(format!(
            "{name} must be finite and >= 0 (got {v})"
        )));
    }
    Ok(())
}

fn prefixed(ctx: String, e: SpotDiffError) -> SpotDiffError {
    match e {
        SpotDiffError::Validation(msg) => SpotDiffError::validation(format!("{ctx}: {msg}")),
        other => other,
    }
}
