use super::*;
use crate::media::library::AssetLibrary;

const JOB: &str = r#"{
    "questions": [
        {"left_image": "Q1_Left.png", "right_image": "Q1_Right.png",
         "diff_points": [{"left_x": 250, "left_y": 230, "right_x": 280, "right_y": 250}]},
        {"left_image": "Q2_Left.png", "right_image": "Q2_Right.png"}
    ]
}"#;

fn assemble(dir: &std::path::Path, json: &str) -> Program {
    let job = Job::from_json_str(json).unwrap();
    let mut resolver = MediaResolver::new(AssetLibrary::new(dir), CANVAS);
    assemble_program(&job, &mut resolver).unwrap()
}

#[test]
fn empty_library_program_has_exact_segment_sum() {
    let dir = tempfile::tempdir().unwrap();
    let p = assemble(dir.path(), JOB);

    // opening 2 + 2 * (bumper 3 + scene 113) + ending 2
    assert_eq!(p.duration, 2.0 + 2.0 * 116.0 + 2.0);
    assert_eq!(p.question_block, (2.0, 234.0));
    assert_eq!(p.total_frames(), 236 * 30);

    let names: Vec<&str> = p.segments.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "opening.mp4",
            "question1.mp4",
            "scene1",
            "question2.mp4",
            "scene2",
            "ending.mp4"
        ]
    );
    for w in p.segments.windows(2) {
        assert_eq!(w[0].end(), w[1].start);
    }
    assert_eq!(p.segments.last().unwrap().end(), p.duration);
}

#[test]
fn bgm_is_looped_over_the_question_block_only() {
    let dir = tempfile::tempdir().unwrap();
    let p = assemble(dir.path(), JOB);
    let bgm = p.audio.iter().find(|a| a.name == "main_bgm.mp3").unwrap();
    assert_eq!(bgm.start, 2.0);
    assert_eq!(bgm.until, 234.0);
    assert_eq!(bgm.clip.duration(), 232.0);
    assert_eq!(bgm.gain, 0.35);
}

#[test]
fn scene_audio_is_shifted_to_absolute_time() {
    let dir = tempfile::tempdir().unwrap();
    let p = assemble(dir.path(), JOB);
    let q2 = &p.questions[1];
    assert_eq!(q2.bumper_start, 118.0);
    assert_eq!(q2.scene_start, 121.0);
    let cheers: Vec<f64> = p
        .audio
        .iter()
        .filter(|a| a.name == "cheer.mp3")
        .map(|a| a.start)
        .collect();
    assert_eq!(cheers, vec![5.0 + 109.0, 121.0 + 109.0]);
}

#[test]
fn segment_lookup_returns_local_time() {
    let dir = tempfile::tempdir().unwrap();
    let p = assemble(dir.path(), JOB);
    let (seg, local) = p.segment_at(6.0).unwrap();
    assert_eq!(seg.name, "scene1");
    assert_eq!(local, 1.0);
    assert!(p.segment_at(p.duration).is_none());
}

#[test]
fn fingerprint_is_stable_and_layout_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let a = assemble(dir.path(), JOB);
    let b = assemble(dir.path(), JOB);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.summary(), b.summary());

    let shorter = JOB.replacen("\"questions\"", "\"timing\": {\"countdown_seconds\": 30}, \"questions\"", 1);
    let c = assemble(dir.path(), &shorter);
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn one_point_question_reveals_once() {
    let dir = tempfile::tempdir().unwrap();
    let p = assemble(dir.path(), JOB);
    assert_eq!(p.questions[0].marker_starts, vec![94.5]);
    assert!(p.questions[1].marker_starts.is_empty());
}
