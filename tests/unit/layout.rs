use proptest::proptest;

use super::*;

#[test]
fn scale_mode_matches_standard_quiet_zone() {
    let plan = plan_layout(25, LayoutMode::scale(10)).unwrap();
    assert_eq!(plan.module_size, 10);
    assert_eq!(plan.quiet_zone_modules, 4);
    assert!(plan.canvas_size >= 25 * 10 + 2 * 4 * 10);
    assert_eq!(plan.canvas_size, 330);
    assert_eq!(plan.content_offset, (0, 0));
    assert_eq!(plan.symbol_origin(), (40, 40));
    assert_eq!(plan.frame_fit, FrameFit::Stretch);
}

#[test]
fn scale_mode_extra_margin_centres_content() {
    let mode = LayoutMode::Scale {
        scale: 5,
        quiet_zone: 2,
        extra_margin: 20,
    };
    let plan = plan_layout(21, mode).unwrap();
    assert_eq!(plan.content_size(), (21 + 4) * 5);
    assert_eq!(plan.canvas_size, 125 + 20);
    assert_eq!(plan.content_offset, (10, 10));
    assert_eq!(plan.symbol_origin(), (20, 20));
}

#[test]
fn fit_canvas_mode_scenario() {
    let plan = plan_layout(25, LayoutMode::fit_canvas(300, 10)).unwrap();
    assert_eq!(plan.module_size, 8);
    assert_eq!(plan.content_size(), 264);
    assert_eq!(plan.content_offset, (18, 18));
    assert_eq!(plan.canvas_size, 300);
    assert_eq!(plan.frame_fit, FrameFit::CenterOnBase);
}

#[test]
fn fit_canvas_offset_truncates_odd_remainder() {
    // 101 - 99 leaves an odd slack of 2 -> offset 1; 100 - 99 -> offset 0 (truncated).
    let a = plan_layout(
        29,
        LayoutMode::FitCanvas {
            canvas_size: 101,
            border: 0,
            quiet_zone: 2,
        },
    )
    .unwrap();
    assert_eq!(a.module_size, 3);
    assert_eq!(a.content_offset, (1, 1));

    let b = plan_layout(
        29,
        LayoutMode::FitCanvas {
            canvas_size: 100,
            border: 0,
            quiet_zone: 2,
        },
    )
    .unwrap();
    assert_eq!(b.content_offset, (0, 0));
}

#[test]
fn fit_canvas_too_small_is_layout_error() {
    let err = plan_layout(177, LayoutMode::fit_canvas(120, 10)).unwrap_err();
    assert!(matches!(err, QrloomError::Layout(_)));
    assert!(err.to_string().contains("matrix too large for target canvas"));
    assert!(err.to_string().contains("177"));
}

#[test]
fn border_wider_than_canvas_is_layout_error() {
    let err = plan_layout(21, LayoutMode::fit_canvas(30, 20)).unwrap_err();
    assert!(matches!(err, QrloomError::Layout(_)));
}

#[test]
fn zero_scale_and_zero_side_are_rejected() {
    assert!(plan_layout(21, LayoutMode::scale(0)).is_err());
    assert!(plan_layout(0, LayoutMode::scale(4)).is_err());
}

#[test]
fn oversized_canvas_is_layout_error() {
    let err = plan_layout(21, LayoutMode::scale(140_000_000)).unwrap_err();
    assert!(matches!(err, QrloomError::Layout(_)));

    let err = plan_layout(21, LayoutMode::fit_canvas(MAX_CANVAS_SIZE + 1, 0)).unwrap_err();
    assert!(matches!(err, QrloomError::Layout(_)));
    assert!(err.to_string().contains(&format!("{}px", MAX_CANVAS_SIZE + 1)));

    let edge = plan_layout(1, LayoutMode::fit_canvas(MAX_CANVAS_SIZE, 0)).unwrap();
    assert_eq!(edge.canvas_size, MAX_CANVAS_SIZE);
}

#[test]
fn module_rect_walks_the_grid() {
    let plan = plan_layout(21, LayoutMode::scale(3)).unwrap();
    assert_eq!(plan.module_rect(0, 0), PixelRect::new(12, 12, 15, 15));
    assert_eq!(plan.module_rect(20, 1), PixelRect::new(72, 15, 75, 18));
    assert_eq!(plan.symbol_rect(), PixelRect::new(12, 12, 75, 75));
}

#[test]
fn layout_mode_json_shape() {
    let mode: LayoutMode =
        serde_json::from_str(r#"{"mode":"fit_canvas","canvas_size":300,"border":10}"#).unwrap();
    assert_eq!(mode, LayoutMode::fit_canvas(300, 10));

    let mode: LayoutMode = serde_json::from_str(r#"{"mode":"scale","scale":6}"#).unwrap();
    assert_eq!(mode, LayoutMode::scale(6));
    assert_eq!(mode.with_quiet_zone(1).quiet_zone(), 1);
}

#[test]
fn layout_never_under_allocates() {
    proptest!(|(n in 1usize..200, s in 1u32..40, qz in 0u32..8, extra in 0u32..64)| {
        let plan = plan_layout(n, LayoutMode::Scale { scale: s, quiet_zone: qz, extra_margin: extra }).unwrap();
        let n = n as u32;
        assert!(plan.canvas_size >= n * s);
        assert!(plan.canvas_size >= n * s + 2 * qz * s);
        let sym = plan.symbol_rect();
        assert!(sym.x1 <= plan.canvas_size && sym.y1 <= plan.canvas_size);
    })
}

#[test]
fn fit_canvas_content_always_fits_and_is_centred() {
    proptest!(|(n in 1usize..120, canvas in 50u32..800, border in 0u32..20, qz in 0u32..6)| {
        let mode = LayoutMode::FitCanvas { canvas_size: canvas, border, quiet_zone: qz };
        if let Ok(plan) = plan_layout(n, mode) {
            let content = plan.content_size();
            assert!(content + 2 * border <= canvas);
            let (ox, oy) = plan.content_offset;
            assert_eq!(ox, oy);
            let slack = canvas - content;
            assert!(ox * 2 == slack || ox * 2 + 1 == slack);
        }
    })
}
