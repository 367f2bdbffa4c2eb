use super::*;

#[test]
fn premultiply_scales_rgb_by_alpha() {
    let p = Rgba8::rgba(100, 50, 200, 128).premultiply();
    assert_eq!(
        p,
        Rgba8Premul {
            r: ((100u16 * 128 + 127) / 255) as u8,
            g: ((50u16 * 128 + 127) / 255) as u8,
            b: ((200u16 * 128 + 127) / 255) as u8,
            a: 128,
        }
    );
    assert_eq!(Rgba8::WHITE.premultiply().to_array(), [255, 255, 255, 255]);
}

#[test]
fn with_opacity_only_touches_alpha() {
    let c = Rgba8::rgb(10, 20, 30).with_opacity(128);
    assert_eq!(c, Rgba8::rgba(10, 20, 30, 128));
    assert_eq!(Rgba8::rgba(1, 2, 3, 128).with_opacity(255).a, 128);
    assert_eq!(Rgba8::BLACK.with_opacity(0).a, 0);
}

#[test]
fn rect_expand_saturates_at_origin() {
    let r = PixelRect::square(2, 10, 5).expand(3);
    assert_eq!(r, PixelRect::new(0, 7, 10, 18));
}

#[test]
fn rect_inset_and_intersect() {
    let r = PixelRect::square(0, 0, 10);
    assert_eq!(r.inset(3), Some(PixelRect::new(3, 3, 7, 7)));
    assert_eq!(r.inset(5), None);

    let other = PixelRect::new(5, 5, 20, 20);
    assert_eq!(r.intersect(other), Some(PixelRect::new(5, 5, 10, 10)));
    assert_eq!(r.intersect(PixelRect::new(10, 0, 12, 4)), None);
}

#[test]
fn rect_contains_is_half_open() {
    let r = PixelRect::new(1, 1, 3, 3);
    assert!(r.contains(1, 1));
    assert!(r.contains(2, 2));
    assert!(!r.contains(3, 2));
    assert!(!r.contains(0, 1));
    assert_eq!((r.width(), r.height()), (2, 2));
}
