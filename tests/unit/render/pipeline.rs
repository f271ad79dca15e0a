use super::*;
use crate::encode::sink::InMemorySink;
use crate::job::model::Job;
use crate::media::library::AssetLibrary;
use crate::media::resolve::MediaResolver;
use crate::timeline::program::{CANVAS, assemble_program};

fn program(dir: &std::path::Path) -> Program {
    let job = Job::from_json_str(
        r#"{"questions": [{"left_image": "L.png", "right_image": "R.png"}]}"#,
    )
    .unwrap();
    let mut resolver = MediaResolver::new(AssetLibrary::new(dir), CANVAS);
    assemble_program(&job, &mut resolver).unwrap()
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn render_range_pushes_frames_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut sink = InMemorySink::new();

    let stats = render_range(&p, range(0, 3), &mut sink, &RenderOpts::default(), None).unwrap();
    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(stats.decoder_spawns, 0);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height, cfg.total_frames), (1920, 1080, 3));

    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    assert_eq!(sink.frames()[0].1.pixel(10, 10), Some([20, 20, 20, 255]));
}

#[test]
fn render_range_rejects_frames_past_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let total = p.total_frames();
    let mut sink = InMemorySink::new();

    let err = render_range(&p, range(total - 1, total + 1), &mut sink, &RenderOpts::default(), None)
        .unwrap_err();
    assert!(err.to_string().contains("exceeds program length"));
    assert!(sink.config().is_none());
}

#[test]
fn zero_threads_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let opts = RenderOpts {
        threads: Some(0),
        ..RenderOpts::default()
    };
    let mut sink = InMemorySink::new();
    assert!(render_range(&p, range(0, 1), &mut sink, &opts, None).is_err());
}

#[test]
fn single_frame_matches_range_render() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let mut sink = InMemorySink::new();
    let f = 30 * 20;
    render_range(&p, range(f, f + 1), &mut sink, &RenderOpts::default(), None).unwrap();

    let single = render_frame_at(&p, FrameIndex(f), Rgba8::rgb(0, 0, 0)).unwrap();
    assert_eq!(sink.frames()[0].1, single);
}

#[test]
fn range_mix_covers_only_the_range() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let out = dir.path().join("mix.f32le");

    write_range_mix(&p, range(30, 90), &out).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    // 2 s * 48 kHz * 2 channels * 4 bytes, all silence
    assert_eq!(bytes.len(), 2 * 48_000 * 2 * 4);
    assert!(bytes.iter().all(|b| *b == 0));
}

#[test]
fn full_range_spans_program() {
    let dir = tempfile::tempdir().unwrap();
    let p = program(dir.path());
    let r = full_range(&p).unwrap();
    assert_eq!(r.start.0, 0);
    assert_eq!(r.end.0, p.total_frames());
}
