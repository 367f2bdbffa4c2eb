use rayon::prelude::*;

use crate::{
    assets::background::BackgroundFrame,
    foundation::core::{Rgba8, Rgba8Premul},
    foundation::error::{QrloomError, QrloomResult},
    foundation::math::{div_alpha_u8, mul_div255_u8},
    layout::{FrameFit, LayoutPlan},
    render::overlay::Overlay,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels: `out = src + dst * (1 - src.a)`.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Blend a premultiplied overlay pixel over a straight-alpha background pixel, returning
/// straight alpha. Fully transparent overlay pixels leave the background bit-exact.
pub fn blend_over_straight(bg: [u8; 4], fg: PremulRgba8) -> [u8; 4] {
    match fg[3] {
        0 => bg,
        255 => fg,
        _ => {
            let dst = Rgba8Premul::from_straight_rgba(bg[0], bg[1], bg[2], bg[3]).to_array();
            let o = over(dst, fg);
            [
                div_alpha_u8(o[0], o[3]),
                div_alpha_u8(o[1], o[3]),
                div_alpha_u8(o[2], o[3]),
                o[3],
            ]
        }
    }
}

/// Blend `overlay` onto `canvas` in place. Both must be the same square size.
pub fn over_in_place(canvas: &mut image::RgbaImage, overlay: &Overlay) -> QrloomResult<()> {
    if canvas.dimensions() != (overlay.size(), overlay.size()) {
        return Err(QrloomError::layout(format!(
            "canvas is {}x{} but overlay is {2}x{2}",
            canvas.width(),
            canvas.height(),
            overlay.size()
        )));
    }
    for (px, fg) in canvas.pixels_mut().zip(overlay.data().chunks_exact(4)) {
        px.0 = blend_over_straight(px.0, [fg[0], fg[1], fg[2], fg[3]]);
    }
    Ok(())
}

/// Resampling filter used to fit background frames. One filter is used for a whole render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour; keeps pixel art crisp.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(f: ResizeFilter) -> Self {
        match f {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Per-render compositor settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeOpts {
    pub filter: ResizeFilter,
    /// Base canvas fill for [`FrameFit::CenterOnBase`] layouts.
    pub base_fill: Rgba8,
    /// Delay used when a frame carries no usable hint, in milliseconds.
    pub default_delay_ms: u32,
    /// Ignore source hints and use `default_delay_ms` for every frame.
    pub override_delays: bool,
}

impl Default for CompositeOpts {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            base_fill: Rgba8::WHITE,
            default_delay_ms: 50,
            override_delays: false,
        }
    }
}

impl CompositeOpts {
    fn delay_for(&self, hint: Option<u32>) -> u32 {
        match hint {
            Some(ms) if ms > 0 && !self.override_delays => ms,
            _ => self.default_delay_ms,
        }
    }
}

/// One output frame: straight-alpha RGBA8 at canvas size plus its display time.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositedFrame {
    pub image: image::RgbaImage,
    pub delay_ms: u32,
}

impl CompositedFrame {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Place one background frame on the canvas and blend the overlay over it.
pub fn composite_frame(
    frame: &BackgroundFrame,
    plan: &LayoutPlan,
    overlay: &Overlay,
    opts: &CompositeOpts,
) -> QrloomResult<CompositedFrame> {
    let mut canvas = place_background(&frame.image, plan, opts);
    over_in_place(&mut canvas, overlay)?;
    Ok(CompositedFrame {
        image: canvas,
        delay_ms: opts.delay_for(frame.delay_ms),
    })
}

fn place_background(
    src: &image::RgbaImage,
    plan: &LayoutPlan,
    opts: &CompositeOpts,
) -> image::RgbaImage {
    let size = plan.canvas_size;
    match plan.frame_fit {
        FrameFit::Stretch => fit(src, size, opts.filter),
        FrameFit::CenterOnBase => {
            let mut base =
                image::RgbaImage::from_pixel(size, size, image::Rgba(opts.base_fill.to_array()));
            let content = fit(src, plan.content_size(), opts.filter);
            let (x, y) = plan.content_offset;
            image::imageops::replace(&mut base, &content, i64::from(x), i64::from(y));
            base
        }
    }
}

fn fit(src: &image::RgbaImage, size: u32, filter: ResizeFilter) -> image::RgbaImage {
    if src.dimensions() == (size, size) {
        return src.clone();
    }
    image::imageops::resize(src, size, size, filter.into())
}

/// Composite every frame in order on the calling thread.
#[tracing::instrument(skip_all, fields(frames = frames.len(), canvas = plan.canvas_size))]
pub fn composite_frames(
    frames: &[BackgroundFrame],
    plan: &LayoutPlan,
    overlay: &Overlay,
    opts: &CompositeOpts,
) -> QrloomResult<Vec<CompositedFrame>> {
    frames
        .iter()
        .map(|f| composite_frame(f, plan, overlay, opts))
        .collect()
}

/// Composite every frame on `pool`. Output order matches input order.
#[tracing::instrument(skip_all, fields(frames = frames.len(), threads = pool.current_num_threads()))]
pub fn composite_frames_parallel(
    frames: &[BackgroundFrame],
    plan: &LayoutPlan,
    overlay: &Overlay,
    opts: &CompositeOpts,
    pool: &rayon::ThreadPool,
) -> QrloomResult<Vec<CompositedFrame>> {
    pool.install(|| {
        frames
            .par_iter()
            .map(|f| composite_frame(f, plan, overlay, opts))
            .collect()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
