//! Sparsity patterns for global matrices.
//!
//! The pattern is built once from cell connectivity and then frozen into the
//! CSR structure of a sparse matrix. Dense matrices accept a pattern only for
//! their shape.

use crate::error::{LaError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsityPattern {
    nrows: usize,
    ncols: usize,
    rows: Vec<BTreeSet<usize>>,
}

impl SparsityPattern {
    /// Empty pattern of the given shape
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: vec![BTreeSet::new(); nrows],
        }
    }

    /// Pattern with every entry present
    pub fn full(nrows: usize, ncols: usize) -> Self {
        let all: BTreeSet<usize> = (0..ncols).collect();
        Self {
            nrows,
            ncols,
            rows: vec![all; nrows],
        }
    }

    /// Diagonal pattern of a square matrix
    pub fn diagonal(n: usize) -> Self {
        let mut pattern = Self::new(n, n);
        for i in 0..n {
            pattern.rows[i].insert(i);
        }
        pattern
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    fn check(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.nrows || col >= self.ncols {
            return Err(LaError::DimensionMismatch(format!(
                "entry ({row}, {col}) outside {}x{} pattern",
                self.nrows, self.ncols
            )));
        }
        Ok(())
    }

    pub fn insert_entry(&mut self, row: usize, col: usize) -> Result<()> {
        self.check(row, col)?;
        self.rows[row].insert(col);
        Ok(())
    }

    /// Insert the dense block `rows x cols`, e.g. the dofs of one cell.
    pub fn insert_block(&mut self, rows: &[usize], cols: &[usize]) -> Result<()> {
        for &r in rows {
            for &c in cols {
                self.check(r, c)?;
            }
        }
        for &r in rows {
            self.rows[r].extend(cols.iter().copied());
        }
        Ok(())
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows.get(row).is_some_and(|cols| cols.contains(&col))
    }

    /// Sorted column indices of `row`
    pub fn row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[row].iter().copied()
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(BTreeSet::len).sum()
    }

    /// Row offsets and sorted column indices in CSR order.
    pub fn csr_structure(&self) -> (Vec<usize>, Vec<usize>) {
        let mut offsets = Vec::with_capacity(self.nrows + 1);
        let mut cols = Vec::with_capacity(self.nnz());
        offsets.push(0);
        for row in &self.rows {
            cols.extend(row.iter().copied());
            offsets.push(cols.len());
        }
        (offsets, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_insert_merges_duplicates() {
        let mut pattern = SparsityPattern::new(4, 4);
        pattern.insert_block(&[0, 1, 2], &[0, 1, 2]).unwrap();
        pattern.insert_block(&[1, 2, 3], &[1, 2, 3]).unwrap();
        assert_eq!(pattern.nnz(), 9 + 9 - 4);
        assert!(pattern.contains(0, 2));
        assert!(!pattern.contains(0, 3));
    }

    #[test]
    fn csr_structure_is_sorted() {
        let mut pattern = SparsityPattern::new(2, 3);
        pattern.insert_entry(0, 2).unwrap();
        pattern.insert_entry(0, 0).unwrap();
        pattern.insert_entry(1, 1).unwrap();
        let (offsets, cols) = pattern.csr_structure();
        assert_eq!(offsets, vec![0, 2, 3]);
        assert_eq!(cols, vec![0, 2, 1]);
    }

    #[test]
    fn out_of_range_insert_fails_without_partial_update() {
        let mut pattern = SparsityPattern::new(2, 2);
        assert!(pattern.insert_block(&[0, 1], &[1, 2]).is_err());
        assert_eq!(pattern.nnz(), 0);
    }
}
