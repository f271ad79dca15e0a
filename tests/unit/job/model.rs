use super::*;

const MINIMAL: &str = r#"{
    "questions": [
        {
            "left_image": "Q1_Left.png",
            "right_image": "Q1_Right.png",
            "diff_points": [
                {"left_x": 250, "left_y": 230, "right_x": 280, "right_y": 250}
            ]
        }
    ]
}"#;

#[test]
fn defaults_fill_unspecified_knobs() {
    let job = Job::from_json_str(MINIMAL).unwrap();
    assert_eq!(job.random_seed, 42);
    assert_eq!(job.timing, Timing::default());
    assert_eq!(job.timing.image_start_delay, 0.5);
    assert_eq!(job.timing.countdown_seconds, 90.0);
    assert_eq!(job.timing.answer_gap_after_seconds, 4.0);
    assert_eq!(job.timing.count10_chroma_threshold, 90.0);
    assert_eq!(job.timing.alarm_chroma_threshold, 90.0);
    assert_eq!(job.bgm_volume, 0.35);
    assert_eq!(job.point_space, PointSpace::Canvas);
    assert_eq!(job.questions[0].diff_points[0].radius, 36.0);
}

#[test]
fn partial_timing_overrides_keep_other_defaults() {
    let json = r#"{
        "questions": [{"left_image": "a.png", "right_image": "b.png"}],
        "timing": {"countdown_seconds": 30},
        "random_seed": 7
    }"#;
    let job = Job::from_json_str(json).unwrap();
    assert_eq!(job.timing.countdown_seconds, 30.0);
    assert_eq!(job.timing.image_start_delay, 0.5);
    assert_eq!(job.random_seed, 7);
    assert!(job.questions[0].diff_points.is_empty());
}

#[test]
fn missing_image_reference_is_rejected() {
    let json = r#"{"questions": [{"left_image": "a.png"}]}"#;
    let err = Job::from_json_str(json).unwrap_err();
    assert!(err.to_string().contains("right_image"));
}

#[test]
fn empty_or_escaping_paths_are_rejected() {
    let empty = r#"{"questions": [{"left_image": "", "right_image": "b.png"}]}"#;
    assert!(Job::from_json_str(empty).is_err());
    let escaping = r#"{"questions": [{"left_image": "../a.png", "right_image": "b.png"}]}"#;
    assert!(Job::from_json_str(escaping).is_err());
}

#[test]
fn negative_timing_and_empty_jobs_are_rejected() {
    let neg = r#"{
        "questions": [{"left_image": "a.png", "right_image": "b.png"}],
        "timing": {"answer_gap_after_seconds": -1}
    }"#;
    assert!(Job::from_json_str(neg).is_err());
    assert!(Job::from_json_str(r#"{"questions": []}"#).is_err());
}

#[test]
fn zero_countdown_is_rejected() {
    let json = r#"{
        "questions": [{"left_image": "a.png", "right_image": "b.png"}],
        "timing": {"countdown_seconds": 0}
    }"#;
    let err = Job::from_json_str(json).unwrap_err();
    assert!(err.to_string().contains("countdown_seconds must be finite and > 0"), "{err}");
}

#[test]
fn zero_radius_is_rejected() {
    let json = r#"{"questions": [{"left_image": "a.png", "right_image": "b.png",
        "diff_points": [{"left_x": 1, "left_y": 1, "right_x": 1, "right_y": 1, "radius": 0}]}]}"#;
    assert!(Job::from_json_str(json).is_err());
}

#[test]
fn revealed_points_truncate_to_three() {
    let p = DiffPoint {
        left_x: 0.0,
        left_y: 0.0,
        right_x: 0.0,
        right_y: 0.0,
        radius: 36.0,
    };
    let q = Question {
        left_image: "a.png".to_string(),
        right_image: "b.png".to_string(),
        diff_points: vec![p; 5],
    };
    assert_eq!(q.revealed_points().len(), 3);

    let q1 = Question {
        diff_points: vec![p],
        ..q
    };
    assert_eq!(q1.revealed_points().len(), 1);
}

#[test]
fn panel_point_space_is_opt_in() {
    let json = r#"{"questions": [{"left_image": "a.png", "right_image": "b.png"}],
        "point_space": "panel"}"#;
    assert_eq!(Job::from_json_str(json).unwrap().point_space, PointSpace::Panel);
}
