//! Error type shared by every container and multiply strategy.

use std::collections::TryReserveError;

use thiserror::Error;

/// Everything that can go wrong inside the kernel.
///
/// All of these are local and deterministic: retrying the same call with
/// the same inputs fails the same way.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatrixError {
    #[error(
        "{op}: dimension mismatch between {}x{} and {}x{} (width x height)",
        lhs.0, lhs.1, rhs.0, rhs.1
    )]
    DimensionMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("buffer of {len} elements does not fit a {width}x{height} matrix")]
    BufferLength {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("cell ({x}, {y}) out of bounds for {width}x{height} matrix")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("failed to allocate a buffer of {len} elements")]
    Allocation {
        len: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    #[error("strassen needs square power-of-two operands, got {width}x{height}")]
    NotSquarePowerOfTwo { width: usize, height: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, MatrixError>;

impl MatrixError {
    pub(crate) fn mismatch(op: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        MatrixError::DimensionMismatch { op, lhs, rhs }
    }
}
