//! Backend trait definitions for global matrices.
//!
//! These traits abstract over the concrete storage used for assembled
//! matrices. Vectors share a single storage type ([`Vector`]) across all
//! backends; element-level matrices stay in nalgebra (small, dense).

use crate::error::{LaError, Result};
use crate::sparsity::SparsityPattern;
use crate::vector::Vector;
use nalgebra::DMatrix;
use std::fmt;
use std::str::FromStr;

use super::Matrix;

/// Matrix norm types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixNorm {
    /// Square root of the sum of squared entries
    Frobenius,
    /// Maximum absolute column sum
    L1,
    /// Maximum absolute row sum
    Linf,
}

impl FromStr for MatrixNorm {
    type Err = LaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "frobenius" => Ok(MatrixNorm::Frobenius),
            "l1" => Ok(MatrixNorm::L1),
            "linf" => Ok(MatrixNorm::Linf),
            other => Err(LaError::UnknownNorm(other.to_string())),
        }
    }
}

/// Operations every global matrix backend provides.
///
/// Row and column indices are global. `add_block` is the assembly entry
/// point: it adds a small dense element matrix into the rows/columns given.
pub trait GenericMatrix: Send + Sync + fmt::Debug {
    /// Human-readable name of the owning backend.
    fn backend_name(&self) -> &'static str;

    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// Size along dimension `dim` (0 = rows, 1 = columns).
    fn size(&self, dim: usize) -> Result<usize> {
        match dim {
            0 => Ok(self.nrows()),
            1 => Ok(self.ncols()),
            _ => Err(LaError::DimensionMismatch(format!(
                "illegal matrix dimension {dim}"
            ))),
        }
    }

    /// Number of stored entries.
    fn nnz(&self) -> usize;

    fn get(&self, row: usize, col: usize) -> Result<f64>;

    fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()>;

    /// Add `block` into the `rows x cols` entries.
    fn add_block(&mut self, rows: &[usize], cols: &[usize], block: &DMatrix<f64>) -> Result<()>;

    fn zero(&mut self);

    /// Replace `rows` by the corresponding rows of the identity.
    fn ident_rows(&mut self, rows: &[usize]) -> Result<()>;

    /// Finalize pending insertions. Native backends insert eagerly.
    fn apply(&mut self) {}

    fn scale(&mut self, a: f64);

    /// Compute `A * x`.
    fn mult(&self, x: &Vector) -> Result<Vector>;

    /// Compute `A^T * x`.
    fn transpmult(&self, x: &Vector) -> Result<Vector>;

    fn norm(&self, norm: MatrixNorm) -> f64;

    /// Column indices and values of the stored entries of `row`.
    fn getrow(&self, row: usize) -> Result<(Vec<usize>, Vec<f64>)>;

    /// Dense copy of the whole matrix.
    fn to_dense(&self) -> DMatrix<f64>;
}

/// Factory producing backend-specific matrices and vectors.
pub trait BackendFactory: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &'static str;

    /// Create a zero matrix with the shape (and, if sparse, the structure)
    /// of `pattern`.
    fn create_matrix(&self, pattern: &SparsityPattern) -> Matrix;

    fn create_vector(&self, size: usize) -> Vector {
        Vector::new(size)
    }
}

pub(crate) fn check_mult_operand(x: &Vector, expected: usize, op: &str) -> Result<()> {
    if x.is_distributed() {
        return Err(LaError::InvalidLayout(format!(
            "{op} needs a serial operand vector"
        )));
    }
    if x.size() != expected {
        return Err(LaError::DimensionMismatch(format!(
            "{op}: vector of size {} does not match matrix dimension {expected}",
            x.size()
        )));
    }
    Ok(())
}

pub(crate) fn check_entry(nrows: usize, ncols: usize, row: usize, col: usize) -> Result<()> {
    if row >= nrows || col >= ncols {
        return Err(LaError::DimensionMismatch(format!(
            "entry ({row}, {col}) outside {nrows}x{ncols} matrix"
        )));
    }
    Ok(())
}

pub(crate) fn check_block(rows: &[usize], cols: &[usize], block: &DMatrix<f64>) -> Result<()> {
    if block.nrows() != rows.len() || block.ncols() != cols.len() {
        return Err(LaError::DimensionMismatch(format!(
            "block is {}x{} but {} rows and {} columns were given",
            block.nrows(),
            block.ncols(),
            rows.len(),
            cols.len()
        )));
    }
    Ok(())
}
