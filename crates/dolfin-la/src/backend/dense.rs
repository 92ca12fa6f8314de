//! Dense backend using nalgebra.
//!
//! Every entry is stored, so the sparsity pattern only fixes the shape.
//! Suitable for small problems and as a reference for the sparse backend.

use super::traits::*;
use super::Matrix;
use crate::error::Result;
use crate::sparsity::SparsityPattern;
use crate::vector::Vector;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    values: DMatrix<f64>,
}

impl DenseMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            values: DMatrix::zeros(nrows, ncols),
        }
    }

    pub fn from_dmatrix(values: DMatrix<f64>) -> Self {
        Self { values }
    }

    pub fn from_row_slice(nrows: usize, ncols: usize, data: &[f64]) -> Self {
        Self::from_dmatrix(DMatrix::from_row_slice(nrows, ncols, data))
    }

    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Raw column-major storage
    pub fn data(&self) -> &[f64] {
        self.values.as_slice()
    }
}

impl GenericMatrix for DenseMatrix {
    fn backend_name(&self) -> &'static str {
        DenseFactory.name()
    }

    fn nrows(&self) -> usize {
        self.values.nrows()
    }

    fn ncols(&self) -> usize {
        self.values.ncols()
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn get(&self, row: usize, col: usize) -> Result<f64> {
        check_entry(self.nrows(), self.ncols(), row, col)?;
        Ok(self.values[(row, col)])
    }

    fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        check_entry(self.nrows(), self.ncols(), row, col)?;
        self.values[(row, col)] = value;
        Ok(())
    }

    fn add_block(&mut self, rows: &[usize], cols: &[usize], block: &DMatrix<f64>) -> Result<()> {
        check_block(rows, cols, block)?;
        for &r in rows {
            for &c in cols {
                check_entry(self.nrows(), self.ncols(), r, c)?;
            }
        }
        for (i, &r) in rows.iter().enumerate() {
            for (j, &c) in cols.iter().enumerate() {
                self.values[(r, c)] += block[(i, j)];
            }
        }
        Ok(())
    }

    fn zero(&mut self) {
        self.values.fill(0.0);
    }

    fn ident_rows(&mut self, rows: &[usize]) -> Result<()> {
        for &r in rows {
            check_entry(self.nrows(), self.ncols(), r, r)?;
        }
        for &r in rows {
            self.values.row_mut(r).fill(0.0);
            self.values[(r, r)] = 1.0;
        }
        Ok(())
    }

    fn scale(&mut self, a: f64) {
        self.values *= a;
    }

    fn mult(&self, x: &Vector) -> Result<Vector> {
        check_mult_operand(x, self.ncols(), "mult")?;
        let y: DVector<f64> = &self.values * x.as_dvector();
        Ok(Vector::from_vec(y.as_slice().to_vec()))
    }

    fn transpmult(&self, x: &Vector) -> Result<Vector> {
        check_mult_operand(x, self.nrows(), "transpmult")?;
        let y: DVector<f64> = self.values.tr_mul(x.as_dvector());
        Ok(Vector::from_vec(y.as_slice().to_vec()))
    }

    fn norm(&self, norm: MatrixNorm) -> f64 {
        match norm {
            MatrixNorm::Frobenius => self.values.norm(),
            MatrixNorm::L1 => self
                .values
                .column_iter()
                .map(|c| c.iter().map(|v| v.abs()).sum::<f64>())
                .fold(0.0, f64::max),
            MatrixNorm::Linf => self
                .values
                .row_iter()
                .map(|r| r.iter().map(|v| v.abs()).sum::<f64>())
                .fold(0.0, f64::max),
        }
    }

    fn getrow(&self, row: usize) -> Result<(Vec<usize>, Vec<f64>)> {
        check_entry(self.nrows(), self.ncols(), row, 0)?;
        let cols = (0..self.ncols()).collect();
        let vals = self.values.row(row).iter().copied().collect();
        Ok((cols, vals))
    }

    fn to_dense(&self) -> DMatrix<f64> {
        self.values.clone()
    }
}

/// Factory for [`DenseMatrix`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseFactory;

impl BackendFactory for DenseFactory {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn create_matrix(&self, pattern: &SparsityPattern) -> Matrix {
        Matrix::Dense(DenseMatrix::zeros(pattern.nrows(), pattern.ncols()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_mult_and_transpmult() {
        // [1 2 3; 4 5 6]
        let a = DenseMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = a.mult(&Vector::from_slice(&[1.0, 1.0, 1.0])).unwrap();
        assert_eq!(y.data(), &[6.0, 15.0]);

        let z = a.transpmult(&Vector::from_slice(&[1.0, -1.0])).unwrap();
        assert_eq!(z.data(), &[-3.0, -3.0, -3.0]);

        assert!(a.mult(&Vector::new(2)).is_err());
        assert!(a.transpmult(&Vector::new(3)).is_err());
    }

    #[test]
    fn dense_norms() {
        let a = DenseMatrix::from_row_slice(2, 2, &[1.0, -2.0, 3.0, 4.0]);
        assert!((a.norm(MatrixNorm::Frobenius) - 30f64.sqrt()).abs() < 1e-14);
        assert_eq!(a.norm(MatrixNorm::L1), 6.0);
        assert_eq!(a.norm(MatrixNorm::Linf), 7.0);
    }

    #[test]
    fn ident_rows_clears_row() {
        let mut a = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        a.ident_rows(&[1]).unwrap();
        assert_eq!(a.to_dense(), DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]));
    }

    #[test]
    fn failed_block_add_leaves_matrix_unchanged() {
        let mut a = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let before = a.clone();
        let block = DMatrix::from_element(2, 2, 1.0);
        assert!(a.add_block(&[0, 2], &[0, 1], &block).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn data_is_column_major() {
        let a = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.data(), &[1.0, 3.0, 2.0, 4.0]);
    }
}
