//! Animation encoding.
//!
//! Composited frames are collected into an [`OutputAnimation`] and serialised by an
//! [`AnimationWriter`]. Files are written to a temporary path next to the target and renamed into
//! place only after the encoder has finished.

/// Atomic file output.
pub mod file;
/// GIF and PNG writers.
pub mod writer;

pub use file::{EncodeOpts, write_animation};
pub use writer::{AnimationWriter, GifWriter, OutputFormat, PngWriter, encode_to_vec};

use crate::foundation::error::{QrloomError, QrloomResult};
use crate::render::composite::CompositedFrame;

/// Ordered frames plus loop behaviour, ready to serialise.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputAnimation {
    pub frames: Vec<CompositedFrame>,
    /// Number of repeats after the first play; `0` loops forever.
    pub loop_count: u16,
}

impl OutputAnimation {
    pub fn new(frames: Vec<CompositedFrame>, loop_count: u16) -> Self {
        Self { frames, loop_count }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Size of the first frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(CompositedFrame::dimensions)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.delay_ms)).sum()
    }

    /// Check there is at least one frame and every frame has the same size.
    pub fn validate(&self) -> QrloomResult<()> {
        let Some(expected) = self.dimensions() else {
            return Err(QrloomError::config("animation has no frames"));
        };
        for (index, f) in self.frames.iter().enumerate() {
            let got = f.dimensions();
            if got != expected {
                return Err(QrloomError::DimensionMismatch {
                    index,
                    got,
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/animation.rs"]
mod tests;
