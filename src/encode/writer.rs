use std::io::Write;
use std::path::Path;

use image::ImageEncoder as _;
use image::codecs::gif::{GifEncoder, Repeat};

use crate::encode::OutputAnimation;
use crate::foundation::error::{QrloomError, QrloomResult};

/// Container format of the output file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Palette-based animated GIF.
    #[default]
    Gif,
    /// Single-frame PNG.
    Png,
}

impl OutputFormat {
    /// Infer from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> QrloomResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gif") => Ok(Self::Gif),
            Some("png") => Ok(Self::Png),
            _ => Err(QrloomError::config(format!(
                "cannot infer output format from '{}' (expected .gif or .png)",
                path.display()
            ))),
        }
    }

    pub fn writer(self, gif_speed: i32) -> Box<dyn AnimationWriter> {
        match self {
            Self::Gif => Box::new(GifWriter { speed: gif_speed }),
            Self::Png => Box::new(PngWriter),
        }
    }
}

/// Serialises a whole animation into a byte stream.
pub trait AnimationWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Write `anim` to `out`. The animation has already been validated.
    fn write(&self, anim: &OutputAnimation, out: &mut dyn Write) -> QrloomResult<()>;
}

/// Animated GIF output. Colour quantisation happens here, after compositing.
#[derive(Clone, Copy, Debug)]
pub struct GifWriter {
    /// NeuQuant speed, `1..=30`; lower is slower and more accurate.
    pub speed: i32,
}

impl Default for GifWriter {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

impl AnimationWriter for GifWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn write(&self, anim: &OutputAnimation, out: &mut dyn Write) -> QrloomResult<()> {
        check_gif_speed(self.speed)?;

        // The trailer is written when the encoder drops, so keep it scoped to this call.
        let mut enc = GifEncoder::new_with_speed(out, self.speed);
        let repeat = match anim.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };
        enc.set_repeat(repeat).map_err(encode_err)?;
        for f in &anim.frames {
            let frame = image::Frame::from_parts(
                f.image.clone(),
                0,
                0,
                gif_delay(f.delay_ms),
            );
            enc.encode_frame(frame).map_err(encode_err)?;
        }
        Ok(())
    }
}

pub(crate) fn check_gif_speed(speed: i32) -> QrloomResult<()> {
    if !(1..=30).contains(&speed) {
        return Err(QrloomError::config(format!(
            "gif speed must be in [1, 30], got {speed}"
        )));
    }
    Ok(())
}

/// GIF stores centiseconds. Round to the nearest one and never emit 0, which viewers replace
/// with their own default.
fn gif_delay(ms: u32) -> image::Delay {
    let cs = ms.saturating_add(5) / 10;
    image::Delay::from_numer_denom_ms(cs.max(1) * 10, 1)
}

/// Still PNG output for one-frame renders.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngWriter;

impl AnimationWriter for PngWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn write(&self, anim: &OutputAnimation, out: &mut dyn Write) -> QrloomResult<()> {
        let [frame] = anim.frames.as_slice() else {
            return Err(QrloomError::config(format!(
                "png output holds a single frame, got {}; use .gif for animations",
                anim.frame_count()
            )));
        };
        let (w, h) = frame.dimensions();
        image::codecs::png::PngEncoder::new(out)
            .write_image(frame.image.as_raw(), w, h, image::ExtendedColorType::Rgba8)
            .map_err(encode_err)
    }
}

/// Encode `anim` in memory, e.g. for serving a render without touching disk.
pub fn encode_to_vec(anim: &OutputAnimation, writer: &dyn AnimationWriter) -> QrloomResult<Vec<u8>> {
    anim.validate()?;
    let mut buf = Vec::new();
    writer.write(anim, &mut buf)?;
    Ok(buf)
}

fn encode_err(e: image::ImageError) -> QrloomError {
    QrloomError::Other(anyhow::Error::new(e).context("encode output image"))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/writer.rs"]
mod tests;
