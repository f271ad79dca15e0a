use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_rejects_zero_and_converts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_round(2.0), 60);
    assert_eq!(fps.secs_to_frames_round(0.51), 15);
}

#[test]
fn rgba8_premul_scales_by_alpha() {
    assert_eq!(Rgba8::rgb(10, 20, 30).to_premul_array(), [10, 20, 30, 255]);
    assert_eq!(Rgba8::rgba(255, 255, 255, 0).to_premul_array(), [0, 0, 0, 0]);
    let half = Rgba8::rgba(200, 100, 0, 128).to_premul_array();
    assert_eq!(half[3], 128);
    assert_eq!(half[0], ((200u16 * 128 + 127) / 255) as u8);
}
