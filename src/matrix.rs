//! QR module matrices and the encoder seam that produces them.
//!
//! The matrix itself is computed by an external QR library; this module only wraps its output in
//! an immutable [`ModuleMatrix`] and answers the geometric questions the renderer asks (is a cell
//! dark, does it belong to a finder pattern).

use crate::foundation::error::{QrloomError, QrloomResult};

/// Side length of a QR finder pattern, in modules.
pub const FINDER_SIDE: usize = 7;

/// Error-correction level requested from the QR collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    /// ~7% recovery.
    L,
    /// ~15% recovery.
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery. Artwork hides part of the symbol, so this is the default.
    #[default]
    H,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Which styling region a matrix cell falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellRegion {
    /// One of the three 7x7 corner markers.
    Finder,
    /// Everything else inside the symbol.
    Data,
}

/// Square boolean module grid, `true` = dark. Row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMatrix {
    side: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Build from a row-major module vector of length `side * side`.
    pub fn from_modules(side: usize, modules: Vec<bool>) -> QrloomResult<Self> {
        if side == 0 {
            return Err(QrloomError::matrix_encoding(
                "module matrix side must be >= 1",
            ));
        }
        if modules.len() != side * side {
            return Err(QrloomError::matrix_encoding(format!(
                "module matrix of side {side} needs {} cells, got {}",
                side * side,
                modules.len()
            )));
        }
        Ok(Self { side, modules })
    }

    /// Build from explicit rows. All rows must have the same length as the row count.
    pub fn from_rows(rows: &[Vec<bool>]) -> QrloomResult<Self> {
        let side = rows.len();
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != side) {
            return Err(QrloomError::matrix_encoding(format!(
                "module matrix row {y} has {} cells, expected {side}",
                row.len()
            )));
        }
        Self::from_modules(side, rows.concat())
    }

    /// Build by evaluating `f(x, y)` for every cell.
    pub fn from_fn(side: usize, f: impl Fn(usize, usize) -> bool) -> QrloomResult<Self> {
        let modules = (0..side)
            .flat_map(|y| (0..side).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::from_modules(side, modules)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Dark/light state of cell `(x, y)`. Out-of-range cells read as light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.side && y < self.side && self.modules[y * self.side + x]
    }

    /// `true` when `(x, y)` lies in the top-left, bottom-left or top-right 7x7 corner block.
    pub fn is_finder(&self, x: usize, y: usize) -> bool {
        let far = self.side.saturating_sub(FINDER_SIDE);
        (x < FINDER_SIDE && y < FINDER_SIDE)
            || (x < FINDER_SIDE && y >= far)
            || (x >= far && y < FINDER_SIDE)
    }

    pub fn region(&self, x: usize, y: usize) -> CellRegion {
        if self.is_finder(x, y) {
            CellRegion::Finder
        } else {
            CellRegion::Data
        }
    }

    /// Iterate `(x, y, dark)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, &dark)| (i % self.side, i / self.side, dark))
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&d| d).count()
    }
}

/// Collaborator that turns a payload string into a module matrix.
pub trait MatrixEncoder: Send + Sync {
    /// Encode `data` at error-correction level `ec`. Payloads are forwarded as-is; any rejection is
    /// reported as [`QrloomError::MatrixEncoding`].
    fn encode(&self, data: &str, ec: EcLevel) -> QrloomResult<ModuleMatrix>;
}

/// [`MatrixEncoder`] backed by the `qrcode` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrCodeEncoder;

impl MatrixEncoder for QrCodeEncoder {
    fn encode(&self, data: &str, ec: EcLevel) -> QrloomResult<ModuleMatrix> {
        let code = qrcode::QrCode::with_error_correction_level(data.as_bytes(), ec.into())
            .map_err(|e| QrloomError::matrix_encoding(format!("{e} (ec level {ec:?})")))?;
        let side = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        tracing::debug!(side, ?ec, "encoded module matrix");
        ModuleMatrix::from_modules(side, modules)
    }
}

#[cfg(test)]
#[path = "../tests/unit/matrix.rs"]
mod tests;
