use std::path::Path;

use crate::{
    assets::background::{BackgroundSource, load_background},
    encode::{EncodeOpts, OutputAnimation, write_animation},
    foundation::error::{QrloomError, QrloomResult},
    layout::{LayoutMode, plan_layout},
    matrix::{EcLevel, MatrixEncoder, QrCodeEncoder},
    render::{
        composite::{CompositeOpts, ResizeFilter, composite_frames, composite_frames_parallel},
        overlay::render_overlay,
    },
    style::StyleConfig,
};

/// Render-wide knobs that are not part of the visual style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOpts {
    pub ec_level: EcLevel,
    /// Resampling filter applied to every background frame.
    pub filter: ResizeFilter,
    /// Frame delay used when the background carries no timing hint, in milliseconds.
    pub default_delay_ms: u32,
    /// Use `default_delay_ms` for every frame, ignoring source hints.
    pub override_delays: bool,
    /// Repeats after the first play; `0` loops forever.
    pub loop_count: u16,
    /// Composite frames on a rayon pool.
    pub parallel: bool,
    /// Pool size when `parallel` is set. `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::default(),
            filter: ResizeFilter::default(),
            default_delay_ms: 50,
            override_delays: false,
            loop_count: 0,
            parallel: false,
            threads: None,
        }
    }
}

impl RenderOpts {
    fn validate(&self) -> QrloomResult<()> {
        if self.default_delay_ms == 0 {
            return Err(QrloomError::config("default_delay_ms must be >= 1"));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(QrloomError::config("render 'threads' must be >= 1 when set"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: usize,
    pub matrix_side: usize,
    pub canvas_size: u32,
    pub module_size: u32,
}

/// Render `url` over `background` with default [`RenderOpts`].
///
/// Pipeline:
/// 1. validate the style (fails before any pixel work)
/// 2. encode the module matrix
/// 3. plan the canvas layout
/// 4. decode every background frame
/// 5. draw the overlay once
/// 6. composite the overlay onto each frame, in order
pub fn render(
    url: &str,
    background: &BackgroundSource,
    style: &StyleConfig,
    layout: LayoutMode,
) -> QrloomResult<OutputAnimation> {
    render_with_stats(url, background, style, layout, &RenderOpts::default()).map(|(anim, _)| anim)
}

pub fn render_with_stats(
    url: &str,
    background: &BackgroundSource,
    style: &StyleConfig,
    layout: LayoutMode,
    opts: &RenderOpts,
) -> QrloomResult<(OutputAnimation, RenderStats)> {
    render_with_encoder(&QrCodeEncoder, url, background, style, layout, opts)
}

/// Like [`render_with_stats`] with a caller-supplied matrix encoder.
#[tracing::instrument(skip_all, fields(url_len = url.len(), ec = ?opts.ec_level))]
pub fn render_with_encoder(
    encoder: &dyn MatrixEncoder,
    url: &str,
    background: &BackgroundSource,
    style: &StyleConfig,
    layout: LayoutMode,
    opts: &RenderOpts,
) -> QrloomResult<(OutputAnimation, RenderStats)> {
    style.validate()?;
    opts.validate()?;

    let matrix = encoder.encode(url, opts.ec_level)?;
    let plan = plan_layout(matrix.side(), layout)?;

    let frames = load_background(background)?;
    let overlay = render_overlay(&matrix, &plan, style)?;

    let composite = CompositeOpts {
        filter: opts.filter,
        base_fill: style.base_fill,
        default_delay_ms: opts.default_delay_ms,
        override_delays: opts.override_delays,
    };
    let composited = if opts.parallel && frames.len() > 1 {
        let pool = build_thread_pool(opts.threads)?;
        composite_frames_parallel(&frames, &plan, &overlay, &composite, &pool)?
    } else {
        composite_frames(&frames, &plan, &overlay, &composite)?
    };

    let stats = RenderStats {
        frames: composited.len(),
        matrix_side: matrix.side(),
        canvas_size: plan.canvas_size,
        module_size: plan.module_size,
    };
    tracing::info!(
        frames = stats.frames,
        canvas = stats.canvas_size,
        "rendered animation"
    );
    Ok((OutputAnimation::new(composited, opts.loop_count), stats))
}

/// Options for [`render_to_file`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderToFileOpts {
    pub render: RenderOpts,
    pub encode: EncodeOpts,
}

/// Render and write the result to `out_path` (`.gif` or single-frame `.png`).
///
/// Output options are checked before any render work starts.
pub fn render_to_file(
    url: &str,
    background: &BackgroundSource,
    style: &StyleConfig,
    layout: LayoutMode,
    out_path: impl AsRef<Path>,
    opts: &RenderToFileOpts,
) -> QrloomResult<RenderStats> {
    let out_path = out_path.as_ref();
    opts.encode.validate(out_path)?;
    let (anim, stats) = render_with_stats(url, background, style, layout, &opts.render)?;
    write_animation(&anim, out_path, &opts.encode)?;
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> QrloomResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| QrloomError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
