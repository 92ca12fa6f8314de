//! Index selections on global vector entries.
//!
//! Single indices and lists accept negative values counted from the end of
//! the vector. Slices follow the usual `start:stop:step` clamping rules.

use crate::error::{LaError, Result};
use std::ops::Range;

/// A selection of global vector entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    Single(isize),
    List(Vec<isize>),
    Slice {
        start: Option<isize>,
        stop: Option<isize>,
        step: isize,
    },
    /// Every entry; a vector reads this as its locally owned block
    Full,
    Mask(Vec<bool>),
}

impl Indices {
    /// `start:stop:step` with explicit bounds.
    pub fn slice(start: isize, stop: isize, step: isize) -> Self {
        Indices::Slice {
            start: Some(start),
            stop: Some(stop),
            step,
        }
    }

    /// Every `step`-th entry of the whole vector.
    pub fn stride(step: isize) -> Self {
        Indices::Slice {
            start: None,
            stop: None,
            step,
        }
    }

    /// Resolve to non-negative global indices for a vector of `size` entries.
    pub fn resolve(&self, size: usize) -> Result<Vec<usize>> {
        match self {
            Indices::Single(i) => Ok(vec![wrap_index(*i, size)?]),
            Indices::List(list) => list.iter().map(|&i| wrap_index(i, size)).collect(),
            Indices::Slice { start, stop, step } => resolve_slice(*start, *stop, *step, size),
            Indices::Full => Ok((0..size).collect()),
            Indices::Mask(mask) => {
                if mask.len() != size {
                    return Err(LaError::SizeMismatch {
                        expected: size,
                        actual: mask.len(),
                    });
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &keep)| keep.then_some(i))
                    .collect())
            }
        }
    }
}

/// Map a possibly negative index into `[0, size)`.
pub fn wrap_index(index: isize, size: usize) -> Result<usize> {
    let n = size as isize;
    let wrapped = if index < 0 { index + n } else { index };
    if wrapped < 0 || wrapped >= n {
        return Err(LaError::IndexOutOfRange { index, size });
    }
    Ok(wrapped as usize)
}

fn resolve_slice(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    size: usize,
) -> Result<Vec<usize>> {
    if step == 0 {
        return Err(LaError::ZeroStep);
    }
    let n = size as isize;
    let (lower, upper) = if step > 0 { (0, n) } else { (-1, n - 1) };
    let clamp = |bound: isize| {
        let bound = if bound < 0 { bound + n } else { bound };
        bound.clamp(lower, upper)
    };

    let (mut i, stop) = if step > 0 {
        (start.map_or(0, clamp), stop.map_or(n, clamp))
    } else {
        (start.map_or(n - 1, clamp), stop.map_or(-1, clamp))
    };

    let mut out = Vec::new();
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(i as usize);
        i += step;
    }
    Ok(out)
}

impl From<isize> for Indices {
    fn from(i: isize) -> Self {
        Indices::Single(i)
    }
}

impl From<usize> for Indices {
    fn from(i: usize) -> Self {
        Indices::Single(i as isize)
    }
}

impl From<i32> for Indices {
    fn from(i: i32) -> Self {
        Indices::Single(i as isize)
    }
}

impl From<Vec<isize>> for Indices {
    fn from(list: Vec<isize>) -> Self {
        Indices::List(list)
    }
}

impl From<&[usize]> for Indices {
    fn from(list: &[usize]) -> Self {
        Indices::List(list.iter().map(|&i| i as isize).collect())
    }
}

impl From<Vec<usize>> for Indices {
    fn from(list: Vec<usize>) -> Self {
        Indices::from(list.as_slice())
    }
}

impl From<Range<usize>> for Indices {
    fn from(range: Range<usize>) -> Self {
        Indices::slice(range.start as isize, range.end as isize, 1)
    }
}

impl From<Vec<bool>> for Indices {
    fn from(mask: Vec<bool>) -> Self {
        Indices::Mask(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_indices_wrap_once() {
        assert_eq!(wrap_index(-1, 10).unwrap(), 9);
        assert_eq!(wrap_index(-10, 10).unwrap(), 0);
        assert_eq!(
            wrap_index(-11, 10),
            Err(LaError::IndexOutOfRange {
                index: -11,
                size: 10
            })
        );
        assert!(wrap_index(10, 10).is_err());
    }

    #[test]
    fn list_fails_on_any_bad_entry() {
        let ok = Indices::List(vec![0, 2, -1]).resolve(5).unwrap();
        assert_eq!(ok, vec![0, 2, 4]);
        assert!(Indices::List(vec![-6, 2]).resolve(5).is_err());
        assert!(Indices::List(vec![5, 2]).resolve(5).is_err());
    }

    #[test]
    fn strided_slice() {
        let idx = Indices::slice(1, 16, 2).resolve(20).unwrap();
        assert_eq!(idx, vec![1, 3, 5, 7, 9, 11, 13, 15]);
    }

    #[test]
    fn slice_clamps_bounds() {
        assert_eq!(Indices::slice(-3, 100, 1).resolve(5).unwrap(), vec![2, 3, 4]);
        assert_eq!(Indices::slice(-100, 2, 1).resolve(5).unwrap(), vec![0, 1]);
        assert!(Indices::slice(4, 2, 1).resolve(5).unwrap().is_empty());
    }

    #[test]
    fn negative_step_walks_down() {
        assert_eq!(Indices::stride(-2).resolve(5).unwrap(), vec![4, 2, 0]);
        assert_eq!(Indices::slice(3, 0, -1).resolve(5).unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(Indices::stride(0).resolve(5), Err(LaError::ZeroStep));
    }

    #[test]
    fn mask_length_must_match() {
        let mask = Indices::Mask(vec![true, false, true]);
        assert_eq!(mask.resolve(3).unwrap(), vec![0, 2]);
        assert!(matches!(
            mask.resolve(4),
            Err(LaError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }
}
