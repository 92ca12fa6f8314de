//! Vector storage shared by every backend.
//!
//! A `Vector` stores the locally owned block of a (possibly distributed)
//! vector in an nalgebra `DVector`. All indexing is by global index; touching
//! an index outside the local ownership range is an error, not a silent
//! no-op.

use crate::error::{LaError, Result};
use crate::index::Indices;
use crate::layout::{Layout, OwnershipRange};
use nalgebra::DVector;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Vector norm types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorNorm {
    L1,
    L2,
    Linf,
}

impl FromStr for VectorNorm {
    type Err = LaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(VectorNorm::L1),
            "l2" => Ok(VectorNorm::L2),
            "linf" => Ok(VectorNorm::Linf),
            other => Err(LaError::UnknownNorm(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    layout: Layout,
    values: DVector<f64>,
}

impl Vector {
    /// Serial zero vector of length `n`
    pub fn new(n: usize) -> Self {
        Self {
            layout: Layout::serial(n),
            values: DVector::zeros(n),
        }
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        let n = values.len();
        Self {
            layout: Layout::serial(n),
            values: DVector::from_vec(values),
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self::from_vec(values.to_vec())
    }

    /// Zero vector holding the block of `global_size` entries owned by `rank`.
    pub fn distributed(global_size: usize, rank: usize, num_processes: usize) -> Result<Self> {
        let layout = Layout::distributed(global_size, rank, num_processes)?;
        Ok(Self::with_layout(layout))
    }

    pub fn with_layout(layout: Layout) -> Self {
        Self {
            values: DVector::zeros(layout.local_size()),
            layout,
        }
    }

    /// Split a serial vector into the block owned by `rank`.
    pub fn scatter(&self, rank: usize, num_processes: usize) -> Result<Self> {
        if self.is_distributed() {
            return Err(LaError::InvalidLayout(
                "cannot scatter an already distributed vector".into(),
            ));
        }
        let layout = Layout::distributed(self.size(), rank, num_processes)?;
        let block = self.values.as_slice()[layout.range.start..layout.range.end].to_vec();
        Ok(Self {
            layout,
            values: DVector::from_vec(block),
        })
    }

    /// Rebuild a serial vector from per-process blocks.
    ///
    /// The blocks must share a global size and their ranges must tile
    /// `[0, N)` without gaps or overlap, in any order.
    pub fn gather(parts: &[Vector]) -> Result<Self> {
        let Some(first) = parts.first() else {
            return Ok(Self::new(0));
        };
        let n = first.size();
        let mut sorted: Vec<&Vector> = parts.iter().collect();
        sorted.sort_by_key(|part| part.local_range().start);

        let mut values = Vec::with_capacity(n);
        let mut next = 0;
        for part in sorted {
            if part.size() != n {
                return Err(LaError::SizeMismatch {
                    expected: n,
                    actual: part.size(),
                });
            }
            let range = part.local_range();
            if range.start != next {
                return Err(LaError::InvalidLayout(format!(
                    "expected block starting at {next}, found [{}, {})",
                    range.start, range.end
                )));
            }
            values.extend_from_slice(part.data());
            next = range.end;
        }
        if next != n {
            return Err(LaError::InvalidLayout(format!(
                "blocks cover [0, {next}) of {n} entries"
            )));
        }
        Ok(Self::from_vec(values))
    }

    /// Global size
    pub fn size(&self) -> usize {
        self.layout.global_size
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn local_size(&self) -> usize {
        self.values.len()
    }

    pub fn local_range(&self) -> OwnershipRange {
        self.layout.range
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_distributed(&self) -> bool {
        self.layout.is_distributed()
    }

    pub fn owns_index(&self, global: usize) -> bool {
        self.layout.range.contains(global)
    }

    /// Copy of the locally owned values
    pub fn array(&self) -> Vec<f64> {
        self.values.as_slice().to_vec()
    }

    /// Locally owned values
    pub fn data(&self) -> &[f64] {
        self.values.as_slice()
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        self.values.as_mut_slice()
    }

    pub fn as_dvector(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    fn local_position(&self, global: usize) -> Result<usize> {
        let range = self.layout.range;
        range.to_local(global).ok_or(LaError::NotOwned {
            index: global,
            start: range.start,
            end: range.end,
        })
    }

    /// Local storage positions of `indices`. `Full` selects the owned block.
    fn local_positions(&self, indices: &Indices) -> Result<Vec<usize>> {
        if let Indices::Full = indices {
            return Ok((0..self.local_size()).collect());
        }
        indices
            .resolve(self.size())?
            .into_iter()
            .map(|global| self.local_position(global))
            .collect()
    }

    pub fn get(&self, index: isize) -> Result<f64> {
        let pos = self.local_positions(&Indices::Single(index))?[0];
        Ok(self.values[pos])
    }

    pub fn set(&mut self, index: isize, value: f64) -> Result<()> {
        let pos = self.local_positions(&Indices::Single(index))?[0];
        self.values[pos] = value;
        Ok(())
    }

    pub fn get_indices(&self, indices: &Indices) -> Result<Vec<f64>> {
        Ok(self
            .local_positions(indices)?
            .into_iter()
            .map(|pos| self.values[pos])
            .collect())
    }

    /// Write `values` into the selected entries.
    ///
    /// With [`Indices::Full`] the values may cover either the owned block or
    /// the whole global vector; in the latter case only the owned part is
    /// used.
    pub fn set_indices(&mut self, indices: &Indices, values: &[f64]) -> Result<()> {
        let positions = self.local_positions(indices)?;
        let values = match indices {
            Indices::Full if values.len() == self.size() && values.len() != positions.len() => {
                let range = self.layout.range;
                &values[range.start..range.end]
            }
            _ => values,
        };
        if positions.len() != values.len() {
            return Err(LaError::SizeMismatch {
                expected: positions.len(),
                actual: values.len(),
            });
        }
        for (pos, &value) in positions.into_iter().zip(values) {
            self.values[pos] = value;
        }
        Ok(())
    }

    /// Set every selected entry to `value`.
    pub fn fill_indices(&mut self, indices: &Indices, value: f64) -> Result<()> {
        for pos in self.local_positions(indices)? {
            self.values[pos] = value;
        }
        Ok(())
    }

    /// Copy the `src_indices` selection of `src` into this vector's
    /// `dst_indices` selection.
    pub fn set_from(
        &mut self,
        dst_indices: &Indices,
        src: &Vector,
        src_indices: &Indices,
    ) -> Result<()> {
        let values = src.get_indices(src_indices)?;
        self.set_indices(dst_indices, &values)
    }

    /// Set all entries to `value`
    pub fn assign(&mut self, value: f64) {
        self.values.fill(value);
    }

    pub fn zero(&mut self) {
        self.assign(0.0);
    }

    /// Sum of the locally owned entries
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn norm(&self, norm: VectorNorm) -> f64 {
        match norm {
            VectorNorm::L1 => self.values.iter().map(|v| v.abs()).sum(),
            VectorNorm::L2 => self.values.norm(),
            VectorNorm::Linf => self.values.iter().fold(0.0, |m: f64, v| m.max(v.abs())),
        }
    }

    fn check_layout(&self, other: &Vector) -> Result<()> {
        if self.size() != other.size() {
            return Err(LaError::SizeMismatch {
                expected: self.size(),
                actual: other.size(),
            });
        }
        if self.layout.range != other.layout.range {
            return Err(LaError::InvalidLayout(format!(
                "local ranges differ: [{}, {}) vs [{}, {})",
                self.layout.range.start,
                self.layout.range.end,
                other.layout.range.start,
                other.layout.range.end
            )));
        }
        Ok(())
    }

    pub fn inner(&self, other: &Vector) -> Result<f64> {
        self.check_layout(other)?;
        Ok(self.values.dot(&other.values))
    }

    /// `self += a * x`
    pub fn axpy(&mut self, a: f64, x: &Vector) -> Result<()> {
        self.check_layout(x)?;
        self.values.axpy(a, &x.values, 1.0);
        Ok(())
    }

    /// Entry-wise product `self[i] *= x[i]`
    pub fn pointwise_mult(&mut self, x: &Vector) -> Result<()> {
        self.check_layout(x)?;
        self.values.component_mul_assign(&x.values);
        Ok(())
    }

    pub fn abs(&mut self) {
        self.values.apply(|v| *v = v.abs());
    }

    /// True if some locally owned entry equals `value` exactly.
    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|&v| v == value)
    }

    /// Entry-wise equality with another vector, as a global-size mask.
    ///
    /// Entries owned elsewhere are `false`, like [`Vector::mask`].
    pub fn eq_mask(&self, other: &Vector) -> Result<Vec<bool>> {
        self.check_layout(other)?;
        let range = self.layout.range;
        let mut mask = vec![false; self.size()];
        for (offset, (a, b)) in self.values.iter().zip(other.values.iter()).enumerate() {
            mask[range.start + offset] = a == b;
        }
        Ok(mask)
    }

    /// Global-size mask selecting owned entries that satisfy `pred`.
    ///
    /// Entries outside the local range are `false`, so the mask can be fed
    /// straight back into [`Indices::Mask`].
    pub fn mask(&self, pred: impl Fn(f64) -> bool) -> Vec<bool> {
        let range = self.layout.range;
        let mut mask = vec![false; self.size()];
        for (offset, &v) in self.values.iter().enumerate() {
            mask[range.start + offset] = pred(v);
        }
        mask
    }

    fn expect_layout(&self, other: &Vector) {
        if let Err(err) = self.check_layout(other) {
            panic!("vector operands are incompatible: {err}");
        }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Vector of size {}>", self.size())
    }
}

impl Add<&Vector> for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Add<&Vector> for Vector {
    type Output = Vector;

    fn add(mut self, rhs: &Vector) -> Vector {
        self += rhs;
        self
    }
}

impl Sub<&Vector> for &Vector {
    type Output = Vector;

    fn sub(self, rhs: &Vector) -> Vector {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Sub<&Vector> for Vector {
    type Output = Vector;

    fn sub(mut self, rhs: &Vector) -> Vector {
        self -= rhs;
        self
    }
}

impl AddAssign<&Vector> for Vector {
    fn add_assign(&mut self, rhs: &Vector) {
        self.expect_layout(rhs);
        self.values += &rhs.values;
    }
}

impl SubAssign<&Vector> for Vector {
    fn sub_assign(&mut self, rhs: &Vector) {
        self.expect_layout(rhs);
        self.values -= &rhs.values;
    }
}

impl MulAssign<f64> for Vector {
    fn mul_assign(&mut self, a: f64) {
        self.values *= a;
    }
}

impl DivAssign<f64> for Vector {
    fn div_assign(&mut self, a: f64) {
        self.values /= a;
    }
}

impl MulAssign<&Vector> for Vector {
    fn mul_assign(&mut self, rhs: &Vector) {
        self.expect_layout(rhs);
        self.values.component_mul_assign(&rhs.values);
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, a: f64) -> Vector {
        let mut out = self.clone();
        out *= a;
        out
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(mut self, a: f64) -> Vector {
        self *= a;
        self
    }
}

impl Mul<&Vector> for f64 {
    type Output = Vector;

    fn mul(self, v: &Vector) -> Vector {
        v * self
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;

    fn mul(self, v: Vector) -> Vector {
        v * self
    }
}

/// Entry-wise product
impl Mul<&Vector> for &Vector {
    type Output = Vector;

    fn mul(self, rhs: &Vector) -> Vector {
        let mut out = self.clone();
        out *= rhs;
        out
    }
}

impl Div<f64> for &Vector {
    type Output = Vector;

    fn div(self, a: f64) -> Vector {
        let mut out = self.clone();
        out /= a;
        out
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(mut self, a: f64) -> Vector {
        self /= a;
        self
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self * -1.0
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self * -1.0
    }
}
