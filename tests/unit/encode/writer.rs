use std::io::Cursor;
use std::path::Path;

use image::{AnimationDecoder as _, Rgba, RgbaImage, codecs::gif::GifDecoder};

use super::*;
use crate::render::composite::CompositedFrame;

fn solid(color: [u8; 4], delay_ms: u32) -> CompositedFrame {
    CompositedFrame {
        image: RgbaImage::from_pixel(6, 6, Rgba(color)),
        delay_ms,
    }
}

#[test]
fn format_is_inferred_from_extension() {
    assert_eq!(OutputFormat::from_path(Path::new("a/b.gif")).unwrap(), OutputFormat::Gif);
    assert_eq!(OutputFormat::from_path(Path::new("B.PNG")).unwrap(), OutputFormat::Png);
    assert!(OutputFormat::from_path(Path::new("out.mp4")).is_err());
    assert!(OutputFormat::from_path(Path::new("noext")).is_err());
}

#[test]
fn gif_keeps_frame_count_and_delays() {
    let anim = OutputAnimation::new(
        vec![
            solid([255, 0, 0, 255], 40),
            solid([0, 0, 255, 255], 120),
            solid([0, 255, 0, 255], 60),
        ],
        0,
    );
    let bytes = encode_to_vec(&anim, &GifWriter::default()).unwrap();
    assert!(bytes.starts_with(b"GIF8"));

    let frames = GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 3);
    let delays: Vec<_> = frames
        .iter()
        .map(|f| {
            let (n, d) = f.delay().numer_denom_ms();
            n / d
        })
        .collect();
    assert_eq!(delays, vec![40, 120, 60]);
    assert_eq!(frames[1].buffer().get_pixel(3, 3).0, [0, 0, 255, 255]);
}

#[test]
fn gif_speed_out_of_range_is_config_error() {
    let anim = OutputAnimation::new(vec![solid([0, 0, 0, 255], 50)], 0);
    let err = encode_to_vec(&anim, &GifWriter { speed: 0 }).unwrap_err();
    assert!(matches!(err, QrloomError::Config(_)));
}

#[test]
fn png_writes_single_frame_losslessly() {
    let anim = OutputAnimation::new(vec![solid([12, 34, 56, 78], 50)], 0);
    let bytes = encode_to_vec(&anim, &PngWriter).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (6, 6));
    assert_eq!(img.get_pixel(0, 5).0, [12, 34, 56, 78]);
}

#[test]
fn png_rejects_multiple_frames() {
    let anim = OutputAnimation::new(
        vec![solid([0, 0, 0, 255], 50), solid([9, 9, 9, 255], 50)],
        0,
    );
    let err = encode_to_vec(&anim, &PngWriter).unwrap_err();
    assert!(matches!(err, QrloomError::Config(_)));
}

#[test]
fn mismatched_frames_never_reach_the_writer() {
    let mut odd = solid([0, 0, 0, 255], 50);
    odd.image = RgbaImage::new(7, 6);
    let anim = OutputAnimation::new(vec![solid([0, 0, 0, 255], 50), odd], 0);
    let err = encode_to_vec(&anim, &GifWriter::default()).unwrap_err();
    assert!(matches!(err, QrloomError::DimensionMismatch { index: 1, .. }));
}

#[test]
fn gif_delays_round_to_centiseconds_with_a_floor() {
    let anim = OutputAnimation::new(
        vec![
            solid([0, 0, 0, 255], 1),
            solid([50, 50, 50, 255], 4),
            solid([100, 100, 100, 255], 15),
            solid([150, 150, 150, 255], 44),
        ],
        0,
    );
    let bytes = encode_to_vec(&anim, &GifWriter::default()).unwrap();
    let delays: Vec<_> = GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .iter()
        .map(|f| {
            let (n, d) = f.delay().numer_denom_ms();
            n / d
        })
        .collect();
    assert_eq!(delays, vec![10, 10, 20, 40]);
}
