//! qrloom renders styled QR overlays onto static or animated background artwork.
//!
//! The pipeline is a chain of pure stages:
//!
//! - encode a URL into a [`ModuleMatrix`]
//! - plan the canvas with [`plan_layout`]
//! - draw the overlay once with [`render_overlay`]
//! - composite it onto every background frame
//! - serialise the frames with [`write_animation`]
//!
//! [`render`] runs the whole chain for one request.
#![forbid(unsafe_code)]

mod foundation;

/// Background decoding.
pub mod assets;
/// JSON render jobs.
pub mod config;
/// Output encoding.
pub mod encode;
/// Canvas geometry.
pub mod layout;
/// Module matrices and the QR collaborator.
pub mod matrix;
/// Entry points.
pub mod pipeline;
/// Overlay drawing and frame compositing.
pub mod render;
/// Style parameters and presets.
pub mod style;

pub use crate::foundation::core::{PixelRect, Rgba8, Rgba8Premul};
pub use crate::foundation::error::{QrloomError, QrloomResult};

pub use crate::assets::background::{BackgroundFrame, BackgroundSource, load_background};
pub use crate::config::RenderJob;
pub use crate::encode::{
    AnimationWriter, EncodeOpts, OutputAnimation, OutputFormat, encode_to_vec, write_animation,
};
pub use crate::layout::{FrameFit, LayoutMode, LayoutPlan, plan_layout};
pub use crate::matrix::{EcLevel, MatrixEncoder, ModuleMatrix, QrCodeEncoder};
pub use crate::pipeline::{
    RenderOpts, RenderStats, RenderToFileOpts, render, render_to_file, render_with_encoder,
    render_with_stats,
};
pub use crate::render::composite::{CompositeOpts, CompositedFrame, ResizeFilter};
pub use crate::render::overlay::{Overlay, render_overlay};
pub use crate::style::{Preset, StyleConfig};
