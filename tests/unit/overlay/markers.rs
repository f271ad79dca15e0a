use super::*;

fn px(img: &PreparedImage, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * img.width + x) * 4) as usize;
    let d = &img.rgba8_premul;
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

#[test]
fn reveal_colors_are_distinct_and_ordered() {
    let a = DiffMarker::for_reveal(0, vec![], 36.0);
    let b = DiffMarker::for_reveal(1, vec![], 36.0);
    let c = DiffMarker::for_reveal(2, vec![], 36.0);
    assert_eq!(a.color, Rgba8::rgb(0, 120, 255));
    assert_eq!(b.color, Rgba8::rgb(255, 220, 0));
    assert_eq!(c.color, Rgba8::rgb(255, 0, 0));
}

#[test]
fn bounds_cover_both_circles_with_stroke() {
    let m = DiffMarker::for_reveal(
        0,
        vec![Point::new(270.0, 380.0), Point::new(1250.0, 400.0)],
        36.0,
    );
    let b = m.bounds();
    // pad = 36 + 4 + 1
    assert_eq!((b.x, b.y), (229, 339));
    assert_eq!(b.width, (1291 - 229) as u32);
    assert_eq!(b.height, (441 - 339) as u32);
}

#[test]
fn circle_outline_is_stroked_and_center_is_clear() {
    let center = Point::new(100.0, 100.0);
    let m = DiffMarker::for_reveal(2, vec![center], 36.0);
    let b = m.bounds();
    let img = m.render(0.0).unwrap();
    assert_eq!((img.width, img.height), (b.width, b.height));

    let cx = (center.x as i64 - b.x) as u32;
    let cy = (center.y as i64 - b.y) as u32;
    assert_eq!(px(&img, cx, cy)[3], 0);
    let ring = px(&img, cx + 36, cy);
    assert!(ring[3] >= 250 && ring[0] >= 250 && ring[1] <= 5, "{ring:?}");
}

#[test]
fn markers_are_time_invariant() {
    let m = DiffMarker::for_reveal(1, vec![Point::new(50.0, 50.0)], 20.0);
    assert_eq!(m.frame_key(0.0), m.frame_key(99.0));
}
