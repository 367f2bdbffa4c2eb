use std::io::Cursor;

use image::{Delay, Frame, Rgba, RgbaImage, codecs::gif::GifEncoder};

use super::*;

fn gif_bytes(colors: &[[u8; 4]], delay_ms: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        for c in colors {
            let img = RgbaImage::from_pixel(8, 6, Rgba(*c));
            enc.encode_frame(Frame::from_parts(
                img,
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            ))
            .unwrap();
        }
    }
    buf
}

fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn animated_gif_yields_every_frame_with_delays() {
    let colors = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
    let frames = decode_background(&gif_bytes(&colors, 80)).unwrap();
    assert_eq!(frames.len(), 3);
    for (f, c) in frames.iter().zip(colors) {
        assert_eq!(f.image.dimensions(), (8, 6));
        assert_eq!(f.image.get_pixel(3, 3).0, c);
        assert_eq!(f.delay_ms, Some(80));
    }
}

#[test]
fn still_png_is_one_frame_without_delay() {
    let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 7, Rgba([1, 2, 3, 4])));
    let frames = decode_background(&png_bytes(img)).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].delay_ms, None);
    assert_eq!(frames[0].image.dimensions(), (5, 7));
    assert_eq!(frames[0].image.get_pixel(0, 0).0, [1, 2, 3, 4]);
}

#[test]
fn grayscale_sources_are_converted_to_rgba() {
    let gray = image::GrayImage::from_pixel(4, 4, image::Luma([90]));
    let frames = decode_background(&png_bytes(image::DynamicImage::ImageLuma8(gray))).unwrap();
    assert_eq!(frames[0].image.get_pixel(2, 2).0, [90, 90, 90, 255]);
}

#[test]
fn missing_path_is_background_not_found() {
    let src = BackgroundSource::path("target/qrloom-definitely-missing/bg.gif");
    let err = load_background(&src).unwrap_err();
    assert!(matches!(err, QrloomError::BackgroundNotFound { .. }));
    assert!(err.to_string().contains("bg.gif"));
}

#[test]
fn garbage_bytes_are_decode_errors() {
    let err = decode_background(b"definitely not an image").unwrap_err();
    assert!(matches!(err, QrloomError::BackgroundDecode(_)));

    let mut broken = b"GIF89a".to_vec();
    broken.extend_from_slice(&[0xff; 16]);
    let err = decode_background(&broken).unwrap_err();
    assert!(matches!(err, QrloomError::BackgroundDecode(_)));
}

#[test]
fn in_memory_source_matches_path_source() {
    let bytes = gif_bytes(&[[9, 9, 9, 255], [200, 100, 50, 255]], 40);
    let dir = std::path::PathBuf::from("target").join("unit_background");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("two.gif");
    std::fs::write(&path, &bytes).unwrap();

    let from_path = load_background(&BackgroundSource::path(&path)).unwrap();
    let from_bytes = load_background(&BackgroundSource::bytes(bytes)).unwrap();
    assert_eq!(from_path, from_bytes);
    assert_eq!(from_path.len(), 2);
}

fn noisy_gif(frames: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        for i in 0..frames {
            let img = RgbaImage::from_fn(24, 24, |x, y| {
                let v = (x * 31 + y * 17 + i * 53) % 256;
                Rgba([v as u8, (v * 3 % 256) as u8, (255 - v) as u8, 255])
            });
            enc.encode_frame(Frame::from_parts(
                img,
                0,
                0,
                Delay::from_numer_denom_ms(50, 1),
            ))
            .unwrap();
        }
    }
    buf
}

#[test]
fn truncated_later_frame_aborts_the_whole_decode() {
    let full = noisy_gif(3);
    assert_eq!(decode_background(&full).unwrap().len(), 3);

    for cut in [full.len() / 2, full.len() * 3 / 4, full.len() - 8] {
        let err = decode_background(&full[..cut]).unwrap_err();
        assert!(
            matches!(err, QrloomError::BackgroundDecode(_)),
            "cut at {cut}: {err}"
        );
    }
}
