//! Overlay styling: colours, paint parameters and named presets.

mod color;
pub mod config;

pub use config::{MAX_FINDER_BLEED_PX, Preset, StyleConfig};
