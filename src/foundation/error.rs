use std::path::PathBuf;

pub type QrloomResult<T> = Result<T, QrloomError>;

#[derive(thiserror::Error, Debug)]
pub enum QrloomError {
    /// The QR collaborator rejected the payload.
    #[error("matrix encoding error: {0}")]
    MatrixEncoding(String),

    #[error("background not found: '{}'", path.display())]
    BackgroundNotFound { path: PathBuf },

    #[error("background decode error: {0}")]
    BackgroundDecode(String),

    /// Geometry is infeasible for the requested inputs.
    #[error("layout error: {0}")]
    Layout(String),

    /// Style or render parameters are out of range. Raised before any pixel work.
    #[error("config error: {0}")]
    Config(String),

    /// Frames handed to the encoder disagree on size. Always a bug upstream.
    #[error(
        "dimension mismatch: frame {index} is {}x{}, expected {}x{}",
        got.0, got.1, expected.0, expected.1
    )]
    DimensionMismatch {
        index: usize,
        got: (u32, u32),
        expected: (u32, u32),
    },

    #[error("io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QrloomError {
    pub fn matrix_encoding(msg: impl Into<String>) -> Self {
        Self::MatrixEncoding(msg.into())
    }

    pub fn background_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BackgroundNotFound { path: path.into() }
    }

    pub fn background_decode(msg: impl Into<String>) -> Self {
        Self::BackgroundDecode(msg.into())
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
