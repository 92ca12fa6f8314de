//! Error types for dolfin-la

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LaError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaError {
    #[error("Index {index} out of range for vector of size {size}")]
    IndexOutOfRange { index: isize, size: usize },

    #[error("Index {index} is not owned by this process (local range [{start}, {end}))")]
    NotOwned {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("Non-matching sizes: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Entry ({row}, {col}) is not in the sparsity pattern")]
    NotInPattern { row: usize, col: usize },

    #[error("Slice step cannot be zero")]
    ZeroStep,

    #[error("Unknown linear algebra backend: {0}")]
    UnknownBackend(String),

    #[error("Unknown norm type: {0}")]
    UnknownNorm(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}
