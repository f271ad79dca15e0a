use super::*;

fn canvas(w: u32, h: u32, px: PremulRgba8) -> Vec<u8> {
    let mut v = vec![0u8; (w * h * 4) as usize];
    fill(&mut v, px);
    v
}

fn at(buf: &[u8], w: u32, x: u32, y: u32) -> PremulRgba8 {
    let i = ((y * w + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
    assert_eq!(over(dst, [0, 0, 0, 0], 1.0), dst);
    assert_eq!(over(dst, [200, 100, 50, 255], 0.0), dst);
}

#[test]
fn over_half_alpha_black_darkens() {
    let out = over([200, 200, 200, 255], [0, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert!((99..=101).contains(&out[0]));
}

#[test]
fn blit_clips_negative_offsets() {
    let (w, h) = (4, 3);
    let mut dst = canvas(w, h, [0, 0, 0, 255]);
    let src = canvas(2, 2, [255, 255, 255, 255]);
    blit_over(
        PixelsMut { width: w, height: h, data: &mut dst },
        Pixels { width: 2, height: 2, data: &src },
        -1,
        -1,
        1.0,
    )
    .unwrap();
    assert_eq!(at(&dst, w, 0, 0), [255, 255, 255, 255]);
    assert_eq!(at(&dst, w, 1, 0), [0, 0, 0, 255]);
    assert_eq!(at(&dst, w, 0, 1), [0, 0, 0, 255]);
}

#[test]
fn blit_clips_far_edges_and_fully_outside_is_noop() {
    let (w, h) = (4, 4);
    let mut dst = canvas(w, h, [0, 0, 0, 255]);
    let src = canvas(3, 3, [9, 9, 9, 255]);
    blit_over(
        PixelsMut { width: w, height: h, data: &mut dst },
        Pixels { width: 3, height: 3, data: &src },
        2,
        3,
        1.0,
    )
    .unwrap();
    assert_eq!(at(&dst, w, 2, 3), [9, 9, 9, 255]);
    assert_eq!(at(&dst, w, 3, 3), [9, 9, 9, 255]);
    assert_eq!(at(&dst, w, 1, 3), [0, 0, 0, 255]);
    assert_eq!(at(&dst, w, 2, 2), [0, 0, 0, 255]);

    let before = dst.clone();
    blit_over(
        PixelsMut { width: w, height: h, data: &mut dst },
        Pixels { width: 3, height: 3, data: &src },
        -929,
        0,
        1.0,
    )
    .unwrap();
    assert_eq!(dst, before);
}

#[test]
fn blit_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 10];
    let src = vec![0u8; 4];
    let err = blit_over(
        PixelsMut { width: 2, height: 2, data: &mut dst },
        Pixels { width: 1, height: 1, data: &src },
        0,
        0,
        1.0,
    )
    .unwrap_err();
    assert!(err.to_string().contains("blit destination"));
}
