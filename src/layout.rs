//! Canvas geometry: module size, quiet zone, canvas side and centring offsets.

use crate::foundation::core::PixelRect;
use crate::foundation::error::{QrloomError, QrloomResult};

/// Standard QR quiet zone width, in modules.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// Largest canvas side accepted, in pixels. GIF stores frame sizes as `u16`.
pub const MAX_CANVAS_SIZE: u32 = u16::MAX as u32;

fn default_quiet_zone() -> u32 {
    DEFAULT_QUIET_ZONE
}

/// How the caller wants the canvas sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    /// Fixed pixels-per-module; the canvas grows to fit.
    Scale {
        /// Pixels per module side.
        scale: u32,
        /// Quiet zone in modules.
        #[serde(default = "default_quiet_zone")]
        quiet_zone: u32,
        /// Extra pixels added around the quiet zone (split evenly on both sides).
        #[serde(default)]
        extra_margin: u32,
    },
    /// Fixed canvas side; the module size is the largest that fits inside `border`.
    FitCanvas {
        /// Output canvas side in pixels.
        canvas_size: u32,
        /// Pixels reserved on each edge before fitting modules.
        #[serde(default)]
        border: u32,
        /// Quiet zone in modules.
        #[serde(default = "default_quiet_zone")]
        quiet_zone: u32,
    },
}

impl LayoutMode {
    pub fn scale(scale: u32) -> Self {
        Self::Scale {
            scale,
            quiet_zone: DEFAULT_QUIET_ZONE,
            extra_margin: 0,
        }
    }

    pub fn fit_canvas(canvas_size: u32, border: u32) -> Self {
        Self::FitCanvas {
            canvas_size,
            border,
            quiet_zone: DEFAULT_QUIET_ZONE,
        }
    }

    pub fn quiet_zone(&self) -> u32 {
        match *self {
            Self::Scale { quiet_zone, .. } | Self::FitCanvas { quiet_zone, .. } => quiet_zone,
        }
    }

    /// Return a copy with the quiet zone replaced.
    pub fn with_quiet_zone(self, qz: u32) -> Self {
        match self {
            Self::Scale {
                scale,
                extra_margin,
                ..
            } => Self::Scale {
                scale,
                quiet_zone: qz,
                extra_margin,
            },
            Self::FitCanvas {
                canvas_size,
                border,
                ..
            } => Self::FitCanvas {
                canvas_size,
                border,
                quiet_zone: qz,
            },
        }
    }
}

/// How background frames are placed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFit {
    /// The frame is resized to the whole canvas.
    Stretch,
    /// The frame is resized to the content box and pasted onto a filled base canvas.
    CenterOnBase,
}

/// Resolved geometry for one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutPlan {
    /// Matrix side `N` the plan was computed for.
    pub matrix_side: u32,
    /// Pixels per module side, always >= 1.
    pub module_size: u32,
    pub quiet_zone_modules: u32,
    /// Square canvas side in pixels.
    pub canvas_size: u32,
    /// Top-left of the content box (quiet zone included).
    pub content_offset: (u32, u32),
    pub frame_fit: FrameFit,
}

impl LayoutPlan {
    /// Side of the content box: symbol plus quiet zone on both sides.
    pub fn content_size(&self) -> u32 {
        (self.matrix_side + 2 * self.quiet_zone_modules) * self.module_size
    }

    /// Pixel origin of matrix cell `(0, 0)`.
    pub fn symbol_origin(&self) -> (u32, u32) {
        let qz = self.quiet_zone_modules * self.module_size;
        (self.content_offset.0 + qz, self.content_offset.1 + qz)
    }

    /// Pixel rectangle covered by the `N x N` symbol, quiet zone excluded.
    pub fn symbol_rect(&self) -> PixelRect {
        let (x, y) = self.symbol_origin();
        PixelRect::square(x, y, self.matrix_side * self.module_size)
    }

    /// Pixel rectangle of matrix cell `(x, y)`.
    pub fn module_rect(&self, x: u32, y: u32) -> PixelRect {
        let (ox, oy) = self.symbol_origin();
        PixelRect::square(
            ox + x * self.module_size,
            oy + y * self.module_size,
            self.module_size,
        )
    }

    /// Content box in canvas pixels.
    pub fn content_rect(&self) -> PixelRect {
        PixelRect::square(
            self.content_offset.0,
            self.content_offset.1,
            self.content_size(),
        )
    }
}

/// Compute the layout for a matrix of side `side` under `mode`. Pure.
pub fn plan_layout(side: usize, mode: LayoutMode) -> QrloomResult<LayoutPlan> {
    let n = u32::try_from(side)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| QrloomError::layout(format!("matrix side {side} is out of range")))?;

    let plan = match mode {
        LayoutMode::Scale {
            scale,
            quiet_zone,
            extra_margin,
        } => {
            if scale == 0 {
                return Err(QrloomError::layout("module scale must be >= 1"));
            }
            let content = modules_with_quiet_zone(n, quiet_zone)?
                .checked_mul(scale)
                .ok_or_else(|| overflow(n, quiet_zone, scale))?;
            let canvas_size = content
                .checked_add(extra_margin)
                .ok_or_else(|| overflow(n, quiet_zone, scale))?;
            let off = (canvas_size - content) / 2;
            LayoutPlan {
                matrix_side: n,
                module_size: scale,
                quiet_zone_modules: quiet_zone,
                canvas_size,
                content_offset: (off, off),
                frame_fit: FrameFit::Stretch,
            }
        }
        LayoutMode::FitCanvas {
            canvas_size,
            border,
            quiet_zone,
        } => {
            if canvas_size == 0 {
                return Err(QrloomError::layout("target canvas size must be >= 1"));
            }
            let usable = border
                .checked_mul(2)
                .and_then(|b| canvas_size.checked_sub(b))
                .ok_or_else(|| {
                    QrloomError::layout(format!(
                        "border {border}px leaves no room on a {canvas_size}px canvas"
                    ))
                })?;
            let cells = modules_with_quiet_zone(n, quiet_zone)?;
            let module_size = usable / cells;
            if module_size < 1 {
                return Err(QrloomError::layout(format!(
                    "matrix too large for target canvas: {n} modules + 2x{quiet_zone} quiet zone \
                     need at least {cells}px, only {usable}px available in {canvas_size}px \
                     canvas with {border}px border"
                )));
            }
            let content = cells * module_size;
            let off = (canvas_size - content) / 2;
            LayoutPlan {
                matrix_side: n,
                module_size,
                quiet_zone_modules: quiet_zone,
                canvas_size,
                content_offset: (off, off),
                frame_fit: FrameFit::CenterOnBase,
            }
        }
    };

    if plan.canvas_size > MAX_CANVAS_SIZE {
        return Err(QrloomError::layout(format!(
            "canvas size {}px exceeds the maximum of {MAX_CANVAS_SIZE}px",
            plan.canvas_size
        )));
    }

    tracing::debug!(
        side = n,
        module_size = plan.module_size,
        canvas_size = plan.canvas_size,
        "planned layout"
    );
    Ok(plan)
}

fn modules_with_quiet_zone(n: u32, quiet_zone: u32) -> QrloomResult<u32> {
    quiet_zone
        .checked_mul(2)
        .and_then(|q| q.checked_add(n))
        .ok_or_else(|| QrloomError::layout(format!("quiet zone {quiet_zone} is out of range")))
}

fn overflow(n: u32, quiet_zone: u32, scale: u32) -> QrloomError {
    QrloomError::layout(format!(
        "canvas size overflows for {n} modules, quiet zone {quiet_zone}, scale {scale}"
    ))
}

#[cfg(test)]
#[path = "../tests/unit/layout.rs"]
mod tests;
