use crate::{
    foundation::core::{PixelRect, Rgba8, Rgba8Premul},
    foundation::error::{QrloomError, QrloomResult},
    foundation::math::div_alpha_u8,
    layout::LayoutPlan,
    matrix::{CellRegion, ModuleMatrix},
    style::StyleConfig,
};

/// Transparent canvas-sized layer holding only the styled QR artwork.
///
/// Pixels are premultiplied RGBA8, tightly packed, row-major. Built once per render by
/// [`render_overlay`] and shared read-only by every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    size: u32,
    data: Vec<u8>,
}

impl Overlay {
    fn transparent(size: u32) -> Self {
        Self {
            size,
            data: vec![0u8; (size as usize) * (size as usize) * 4],
        }
    }

    /// Canvas side in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Premultiplied pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not less than [`Overlay::size`].
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8Premul {
        let i = self.index(x, y);
        Rgba8Premul {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
            a: self.data[i + 3],
        }
    }

    /// Alpha at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not less than [`Overlay::size`].
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y) + 3]
    }

    /// Straight-alpha copy, e.g. for writing the overlay alone to a PNG.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.size, self.size);
        for (dst, src) in out.pixels_mut().zip(self.data.chunks_exact(4)) {
            let a = src[3];
            dst.0 = [
                div_alpha_u8(src[0], a),
                div_alpha_u8(src[1], a),
                div_alpha_u8(src[2], a),
                a,
            ];
        }
        out
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.size && y < self.size,
            "pixel ({x}, {y}) is outside the {0}x{0} overlay",
            self.size
        );
        ((y as usize) * (self.size as usize) + (x as usize)) * 4
    }

    /// Replace every pixel in `rect` (clipped to the canvas) with `color`.
    fn fill(&mut self, rect: PixelRect, color: Rgba8) {
        let Some(rect) = rect.intersect(PixelRect::square(0, 0, self.size)) else {
            return;
        };
        let px = color.premultiply().to_array();
        for y in rect.y0..rect.y1 {
            let start = self.index(rect.x0, y);
            let end = start + rect.width() as usize * 4;
            for d in self.data[start..end].chunks_exact_mut(4) {
                d.copy_from_slice(&px);
            }
        }
    }
}

/// Paint `matrix` onto a fresh transparent overlay using `plan` geometry and `style` paint.
///
/// Paint order is fixed: finder halos and light finder cells, then dark finder cores, then data
/// dots. Nothing is painted outside the `N x N` symbol, so the quiet zone stays transparent.
#[tracing::instrument(skip_all, fields(side = matrix.side(), canvas = plan.canvas_size))]
pub fn render_overlay(
    matrix: &ModuleMatrix,
    plan: &LayoutPlan,
    style: &StyleConfig,
) -> QrloomResult<Overlay> {
    style.validate()?;
    if plan.matrix_side as usize != matrix.side() {
        return Err(QrloomError::layout(format!(
            "layout was planned for a {0}x{0} matrix but the matrix is {1}x{1}",
            plan.matrix_side,
            matrix.side()
        )));
    }

    let mut overlay = Overlay::transparent(plan.canvas_size);
    let clip = plan.symbol_rect();
    let cell = |x: usize, y: usize| plan.module_rect(x as u32, y as u32);

    let halo = style.finder_light_color.unwrap_or(Rgba8::WHITE);
    for (x, y, dark) in matrix.cells() {
        if matrix.region(x, y) != CellRegion::Finder {
            continue;
        }
        if dark && style.finder_bleed_px > 0 {
            if let Some(r) = cell(x, y).expand(style.finder_bleed_px).intersect(clip) {
                overlay.fill(r, halo);
            }
        } else if !dark && let Some(light) = style.finder_light_color {
            overlay.fill(cell(x, y), light);
        }
    }

    for (x, y, dark) in matrix.cells() {
        if dark && matrix.region(x, y) == CellRegion::Finder {
            overlay.fill(cell(x, y), style.finder_dark_color);
        }
    }

    let pad = style.padding_px(plan.module_size);
    let dark_fill = style.effective_dark();
    for (x, y, dark) in matrix.cells() {
        if matrix.region(x, y) != CellRegion::Data {
            continue;
        }
        let module = cell(x, y);
        let Some(dot) = module.inset(pad) else {
            continue;
        };
        if dark {
            if let Some(ring) = style.data_outline
                && let Some(r) = dot.expand(1).intersect(module)
            {
                overlay.fill(r, ring);
            }
            overlay.fill(dot, dark_fill);
        } else if let Some(light) = style.light_color {
            overlay.fill(dot, light);
        }
    }

    tracing::debug!(
        module_size = plan.module_size,
        padding_px = pad,
        dark_modules = matrix.dark_count(),
        "rendered overlay"
    );
    Ok(overlay)
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
