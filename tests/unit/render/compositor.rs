use super::*;
use crate::job::model::Job;
use crate::media::library::AssetLibrary;
use crate::media::resolve::MediaResolver;
use crate::timeline::program::{CANVAS, assemble_program};

const JOB: &str = r#"{
    "questions": [
        {"left_image": "Q1_Left.png", "right_image": "Q1_Right.png",
         "diff_points": [{"left_x": 250, "left_y": 230, "right_x": 280, "right_y": 250}]}
    ],
    "point_space": "panel"
}"#;

// opening 0..2, question1 bumper 2..5, scene1 5..118, ending 118..120
const SCENE: f64 = 5.0;

fn program(dir: &std::path::Path) -> Program {
    let job = Job::from_json_str(JOB).unwrap();
    let mut resolver = MediaResolver::new(AssetLibrary::new(dir), CANVAS);
    assemble_program(&job, &mut resolver).unwrap()
}

fn rgb(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 3] {
    let [r, g, b, _] = frame.pixel(x, y).unwrap();
    [r, g, b]
}

#[test]
fn missing_bumpers_render_as_dark_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    let opening = c.render(&p, 1.0).unwrap();
    assert_eq!(opening.pixel(960, 540), Some([20, 20, 20, 255]));
    let bumper = c.render(&p, 3.0).unwrap();
    assert_eq!(bumper.pixel(0, 0), Some([20, 20, 20, 255]));
    let ending = c.render(&p, 119.0).unwrap();
    assert_eq!(ending.pixel(1919, 1079), Some([20, 20, 20, 255]));
    assert_eq!(c.live_decoders(), 0);
}

#[test]
fn panels_slide_in_over_background() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    let first = c.render(&p, SCENE).unwrap();
    assert_eq!(rgb(&first, 960, 540), [30, 30, 30]);
    assert_eq!(rgb(&first, 500, 540), [30, 30, 30]);

    let settled = c.render(&p, SCENE + 10.0).unwrap();
    assert_eq!(rgb(&settled, 100, 300), [240, 240, 240]);
    assert_eq!(rgb(&settled, 1800, 900), [240, 240, 240]);
    assert_eq!(rgb(&settled, 960, 540), [30, 30, 30]);
    assert_eq!(rgb(&settled, 960, 100), [30, 30, 30]);
}

#[test]
fn countdown_badge_darkens_top_right_corner() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    let frame = c.render(&p, SCENE + 10.0).unwrap();
    let [r, g, b] = rgb(&frame, 1641, 84);
    assert!(r < 30 && g < 30 && b < 30, "badge pixel {r},{g},{b}");
    assert_eq!(rgb(&frame, 1600, 84), [30, 30, 30]);

    // the badge gives way to count10 for the last ten seconds
    let late = c.render(&p, SCENE + 85.0).unwrap();
    assert_eq!(rgb(&late, 1700, 100), [20, 20, 20]);
}

#[test]
fn alarm_placeholder_covers_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    let frame = c.render(&p, SCENE + 91.0).unwrap();
    assert_eq!(rgb(&frame, 100, 300), [20, 20, 20]);
    assert_eq!(rgb(&frame, 960, 540), [20, 20, 20]);
}

#[test]
fn marker_circle_appears_after_reveal() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let reveal = p.questions[0].marker_starts[0];
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    // panel-local (250, 230) lands at canvas (270, 380); radius 36
    let before = c.render(&p, SCENE + reveal - 0.5).unwrap();
    assert_eq!(rgb(&before, 306, 380), [240, 240, 240]);

    let after = c.render(&p, SCENE + reveal + 0.5).unwrap();
    let [r, g, b] = rgb(&after, 306, 380);
    assert!(b > 200 && r < 60, "marker pixel {r},{g},{b}");
    assert_eq!(rgb(&after, 270, 380), [240, 240, 240]);
}

#[test]
fn procedural_frames_are_cached_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut c = Compositor::new(Rgba8::rgb(0, 0, 0));

    let a = c.render(&p, SCENE + 10.0).unwrap();
    let b = c.render(&p, SCENE + 10.2).unwrap();
    assert_eq!(a, b);
    assert_eq!(c.overlays.len(), 1);
}
