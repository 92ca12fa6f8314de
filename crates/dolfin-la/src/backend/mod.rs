//! Linear algebra backend abstraction layer.
//!
//! Assembled matrices are created through a [`BackendFactory`], so assembly
//! and the code consuming matrices stay backend-agnostic. The concrete
//! storage is selected at runtime by name.
//!
//! # Backends
//!
//! - **sparse** (default): CSR storage from nalgebra-sparse with a structure
//!   fixed by the sparsity pattern. Row-parallel mat-vec via rayon.
//! - **dense**: nalgebra `DMatrix`. Every entry is writable.
//!
//! # Architecture
//!
//! ```text
//! Cell loop (nalgebra DMatrix — small, dense)
//!         │
//!         ▼
//! SparsityPattern ──► BackendFactory::create_matrix
//!    ┌────┴────┐
//!    ▼         ▼
//!  Dense     Sparse
//! Matrix     Matrix
//! ```

pub mod dense;
pub mod sparse;
pub mod traits;

pub use dense::{DenseFactory, DenseMatrix};
pub use sparse::{SparseFactory, SparseMatrix};
pub use traits::*;

use crate::error::{LaError, Result};
use crate::vector::Vector;
use nalgebra::DMatrix;
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

/// Available backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Dense,
    Sparse,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Sparse, BackendKind::Dense];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Dense => "dense",
            BackendKind::Sparse => "sparse",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = LaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "sparse" => Ok(BackendKind::Sparse),
            "dense" => Ok(BackendKind::Dense),
            _ => Err(LaError::UnknownBackend(s.to_string())),
        }
    }
}

/// Returns the factory for `kind`.
pub fn factory(kind: BackendKind) -> Box<dyn BackendFactory> {
    match kind {
        BackendKind::Dense => Box::new(DenseFactory),
        BackendKind::Sparse => Box::new(SparseFactory),
    }
}

/// Returns the default backend factory (sparse).
pub fn default_factory() -> Box<dyn BackendFactory> {
    Box::new(SparseFactory)
}

/// True if `name` selects a backend compiled into this crate.
pub fn has_linear_algebra_backend(name: &str) -> bool {
    name.parse::<BackendKind>().is_ok()
}

pub fn available_backends() -> Vec<&'static str> {
    BackendKind::ALL.iter().map(BackendKind::name).collect()
}

/// A matrix of any backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    Dense(DenseMatrix),
    Sparse(SparseMatrix),
}

impl Matrix {
    pub fn kind(&self) -> BackendKind {
        match self {
            Matrix::Dense(_) => BackendKind::Dense,
            Matrix::Sparse(_) => BackendKind::Sparse,
        }
    }

    /// Concrete dense matrix, if this is one
    pub fn as_dense(&self) -> Option<&DenseMatrix> {
        match self {
            Matrix::Dense(m) => Some(m),
            Matrix::Sparse(_) => None,
        }
    }

    /// Concrete sparse matrix, if this is one
    pub fn as_sparse(&self) -> Option<&SparseMatrix> {
        match self {
            Matrix::Sparse(m) => Some(m),
            Matrix::Dense(_) => None,
        }
    }

    fn inner(&self) -> &dyn GenericMatrix {
        match self {
            Matrix::Dense(m) => m,
            Matrix::Sparse(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn GenericMatrix {
        match self {
            Matrix::Dense(m) => m,
            Matrix::Sparse(m) => m,
        }
    }
}

impl GenericMatrix for Matrix {
    fn backend_name(&self) -> &'static str {
        self.inner().backend_name()
    }

    fn nrows(&self) -> usize {
        self.inner().nrows()
    }

    fn ncols(&self) -> usize {
        self.inner().ncols()
    }

    fn nnz(&self) -> usize {
        self.inner().nnz()
    }

    fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.inner().get(row, col)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.inner_mut().set(row, col, value)
    }

    fn add_block(&mut self, rows: &[usize], cols: &[usize], block: &DMatrix<f64>) -> Result<()> {
        self.inner_mut().add_block(rows, cols, block)
    }

    fn zero(&mut self) {
        self.inner_mut().zero()
    }

    fn ident_rows(&mut self, rows: &[usize]) -> Result<()> {
        self.inner_mut().ident_rows(rows)
    }

    fn apply(&mut self) {
        self.inner_mut().apply()
    }

    fn scale(&mut self, a: f64) {
        self.inner_mut().scale(a)
    }

    fn mult(&self, x: &Vector) -> Result<Vector> {
        self.inner().mult(x)
    }

    fn transpmult(&self, x: &Vector) -> Result<Vector> {
        self.inner().transpmult(x)
    }

    fn norm(&self, norm: MatrixNorm) -> f64 {
        self.inner().norm(norm)
    }

    fn getrow(&self, row: usize) -> Result<(Vec<usize>, Vec<f64>)> {
        self.inner().getrow(row)
    }

    fn to_dense(&self) -> DMatrix<f64> {
        self.inner().to_dense()
    }
}

/// Matrix-vector product.
///
/// # Panics
///
/// Panics if the vector length does not match the number of columns; use
/// [`GenericMatrix::mult`] for a fallible product.
impl Mul<&Vector> for &Matrix {
    type Output = Vector;

    fn mul(self, x: &Vector) -> Vector {
        match self.mult(x) {
            Ok(y) => y,
            Err(err) => panic!("matrix-vector product failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparsity::SparsityPattern;

    #[test]
    fn backend_names_parse() {
        assert_eq!("Dense".parse::<BackendKind>().unwrap(), BackendKind::Dense);
        assert_eq!("default".parse::<BackendKind>().unwrap(), BackendKind::Sparse);
        assert!(has_linear_algebra_backend("sparse"));
        assert!(!has_linear_algebra_backend("PETSc"));
        assert_eq!(available_backends(), vec!["sparse", "dense"]);
    }

    #[test]
    fn factories_create_matching_matrices() {
        let pattern = SparsityPattern::diagonal(3);
        for kind in BackendKind::ALL {
            let m = factory(kind).create_matrix(&pattern);
            assert_eq!(m.kind(), kind);
            assert_eq!(m.backend_name(), kind.name());
            assert_eq!(m.size(0).unwrap(), 3);
            assert!(m.size(2).is_err());
        }
        assert!(factory(BackendKind::Dense).create_matrix(&pattern).as_dense().is_some());
        assert!(default_factory().create_matrix(&pattern).as_sparse().is_some());
    }

    #[test]
    #[should_panic(expected = "matrix-vector product failed")]
    fn mul_operator_panics_on_mismatch() {
        let m = factory(BackendKind::Dense).create_matrix(&SparsityPattern::new(2, 3));
        let _ = &m * &Vector::new(2);
    }
}
