use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{AnimationDecoder, ImageFormat};

use crate::foundation::error::{QrloomError, QrloomResult};

/// One decoded background frame, always RGBA8 straight alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundFrame {
    pub image: image::RgbaImage,
    /// Display-time hint from the source, in milliseconds. `None` for still images.
    pub delay_ms: Option<u32>,
}

impl BackgroundFrame {
    /// A still frame with no timing hint.
    pub fn still(image: image::RgbaImage) -> Self {
        Self {
            image,
            delay_ms: None,
        }
    }
}

/// Where background artwork comes from.
#[derive(Clone, Debug)]
pub enum BackgroundSource {
    Path(PathBuf),
    /// Encoded image bytes, e.g. an upload held in memory.
    Bytes(Arc<[u8]>),
}

impl BackgroundSource {
    pub fn path(p: impl Into<PathBuf>) -> Self {
        Self::Path(p.into())
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(b.into())
    }
}

/// Decode every frame of `source` in display order.
///
/// Animated GIF, APNG and animated WebP yield one frame per source frame; anything else the
/// `image` crate can read yields exactly one frame.
#[tracing::instrument(skip_all)]
pub fn load_background(source: &BackgroundSource) -> QrloomResult<Vec<BackgroundFrame>> {
    let frames = match source {
        BackgroundSource::Path(path) => decode_background(&read_source(path)?),
        BackgroundSource::Bytes(bytes) => decode_background(bytes),
    }?;
    tracing::debug!(frames = frames.len(), "decoded background");
    Ok(frames)
}

fn read_source(path: &Path) -> QrloomResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => QrloomError::background_not_found(path),
        _ => QrloomError::io(path, e),
    })
}

/// Decode encoded image bytes into background frames.
pub fn decode_background(bytes: &[u8]) -> QrloomResult<Vec<BackgroundFrame>> {
    let format = image::guess_format(bytes).map_err(decode_err)?;
    let frames = match format {
        ImageFormat::Gif => {
            let gif = image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
            collect_animation(gif)?
        }
        ImageFormat::Png => {
            let png =
                image::codecs::png::PngDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
            if png.is_apng().map_err(decode_err)? {
                collect_animation(png.apng().map_err(decode_err)?)?
            } else {
                vec![decode_still(png)?]
            }
        }
        ImageFormat::WebP => {
            let webp =
                image::codecs::webp::WebPDecoder::new(Cursor::new(bytes)).map_err(decode_err)?;
            if webp.has_animation() {
                collect_animation(webp)?
            } else {
                vec![decode_still(webp)?]
            }
        }
        other => {
            let img = image::load_from_memory_with_format(bytes, other).map_err(decode_err)?;
            vec![BackgroundFrame::still(img.to_rgba8())]
        }
    };

    if frames.is_empty() {
        return Err(QrloomError::background_decode(format!(
            "{format:?} source contains no frames"
        )));
    }
    Ok(frames)
}

fn decode_still(decoder: impl image::ImageDecoder) -> QrloomResult<BackgroundFrame> {
    let img = image::DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    Ok(BackgroundFrame::still(img.to_rgba8()))
}

fn collect_animation<'a>(
    decoder: impl AnimationDecoder<'a>,
) -> QrloomResult<Vec<BackgroundFrame>> {
    decoder
        .into_frames()
        .enumerate()
        .map(|(i, frame)| {
            let frame = frame.map_err(|e| {
                QrloomError::background_decode(format!("frame {i} failed to decode: {e}"))
            })?;
            let (num, den) = frame.delay().numer_denom_ms();
            let delay_ms = if den == 0 { 0 } else { (num + den / 2) / den };
            Ok(BackgroundFrame {
                image: frame.into_buffer(),
                delay_ms: Some(delay_ms),
            })
        })
        .collect()
}

fn decode_err(e: image::ImageError) -> QrloomError {
    QrloomError::background_decode(e.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
