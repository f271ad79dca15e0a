use super::*;

fn px(img: &PreparedImage, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * img.width + x) * 4) as usize;
    let d = &img.rgba8_premul;
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

#[test]
fn remaining_counts_down_whole_seconds_and_clamps() {
    let b = CountdownBadge::new(90, 1920);
    assert_eq!(b.remaining(0.0), 90);
    assert_eq!(b.remaining(0.99), 90);
    assert_eq!(b.remaining(1.0), 89);
    assert_eq!(b.remaining(89.5), 1);
    assert_eq!(b.remaining(90.0), 0);
    assert_eq!(b.remaining(500.0), 0);
}

#[test]
fn labels_pad_below_one_hundred() {
    assert_eq!(format_remaining(0), "00");
    assert_eq!(format_remaining(7), "07");
    assert_eq!(format_remaining(99), "99");
    assert_eq!(format_remaining(100), "100");
    assert_eq!(CountdownBadge::new(120, 1920).label(0.0), "120");
}

#[test]
fn badge_is_right_anchored() {
    let b = CountdownBadge::new(90, 1920);
    assert_eq!(
        b.bounds(),
        OverlayBounds {
            x: 1920 - 260 - 24,
            y: 24,
            width: 260,
            height: 120
        }
    );
}

#[test]
fn frame_key_changes_once_per_second() {
    let b = CountdownBadge::new(90, 1920);
    assert_eq!(b.frame_key(3.1), b.frame_key(3.9));
    assert_ne!(b.frame_key(3.9), b.frame_key(4.0));
}

#[test]
fn render_draws_rounded_badge_and_numeral() {
    let b = CountdownBadge::new(90, 1920);
    let img = b.render(0.0).unwrap();
    assert_eq!((img.width, img.height), (260, 120));
    // Rounded corner stays clear.
    assert_eq!(px(&img, 0, 0)[3], 0);
    // Badge body is translucent black.
    let body = px(&img, 130, 8);
    assert!((140..=160).contains(&body[3]), "{body:?}");
    assert!(body[0] <= 2);
    // Top bar of the leading "9" (box starts at x=84, y=24).
    let seg = px(&img, 104, 28);
    assert!(seg[0] >= 250 && seg[3] >= 250, "{seg:?}");
}

#[test]
fn render_is_pure() {
    let b = CountdownBadge::new(90, 1920);
    let a = b.render(12.3).unwrap();
    let c = b.render(12.7).unwrap();
    assert_eq!(a.rgba8_premul, c.rgba8_premul);
}
