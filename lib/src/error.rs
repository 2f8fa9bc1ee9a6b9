use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decimating or encoding a curve.
///
/// End of stream is not an error: [`crate::Decimator`] is an [`Iterator`]
/// and signals exhaustion with `None`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The point has no defined bearing from the current pivot, e.g. it
    /// shares the pivot's x or carries a NaN coordinate.
    #[error("degenerate geometry: point ({x}, {y}) has no bearing from the pivot")]
    DegenerateGeometry { x: f64, y: f64 },

    #[error("bad float format {0:?}: expected e.g. '%.6e', '%.2f' or '%g'")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
