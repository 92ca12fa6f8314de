//! Ownership ranges for (possibly) distributed vectors.
//!
//! A distributed vector of global size `N` spread over `p` processes stores
//! only the contiguous block `[start, end)` owned by the local rank. The
//! partition hands one extra entry to each of the first `N mod p` ranks.

use crate::error::{LaError, Result};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` of global indices owned locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipRange {
    pub start: usize,
    pub end: usize,
}

impl OwnershipRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, global: usize) -> bool {
        self.start <= global && global < self.end
    }

    /// Map a global index to its position in local storage.
    pub fn to_local(&self, global: usize) -> Option<usize> {
        self.contains(global).then(|| global - self.start)
    }
}

/// Compute the range owned by `rank` when `global_size` entries are split
/// over `num_processes` ranks.
pub fn local_range(
    rank: usize,
    num_processes: usize,
    global_size: usize,
) -> Result<OwnershipRange> {
    if num_processes == 0 {
        return Err(LaError::InvalidLayout(
            "number of processes must be positive".into(),
        ));
    }
    if rank >= num_processes {
        return Err(LaError::InvalidLayout(format!(
            "rank {rank} out of range for {num_processes} processes"
        )));
    }
    let n = global_size / num_processes;
    let r = global_size % num_processes;
    let range = if rank < r {
        let start = rank * (n + 1);
        OwnershipRange::new(start, start + n + 1)
    } else {
        let start = rank * n + r;
        OwnershipRange::new(start, start + n)
    };
    Ok(range)
}

/// Parallel layout of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub global_size: usize,
    pub rank: usize,
    pub num_processes: usize,
    pub range: OwnershipRange,
}

impl Layout {
    /// Layout of a vector owned entirely by a single process
    pub fn serial(global_size: usize) -> Self {
        Self {
            global_size,
            rank: 0,
            num_processes: 1,
            range: OwnershipRange::new(0, global_size),
        }
    }

    /// Layout of the block owned by `rank` out of `num_processes`
    pub fn distributed(global_size: usize, rank: usize, num_processes: usize) -> Result<Self> {
        Ok(Self {
            global_size,
            rank,
            num_processes,
            range: local_range(rank, num_processes, global_size)?,
        })
    }

    pub fn local_size(&self) -> usize {
        self.range.len()
    }

    /// True unless the local range covers every global index.
    pub fn is_distributed(&self) -> bool {
        self.range.len() != self.global_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_tile_global_index_set() {
        let n = 16;
        let p = 3;
        let ranges: Vec<_> = (0..p).map(|rank| local_range(rank, p, n).unwrap()).collect();
        assert_eq!(ranges[0], OwnershipRange::new(0, 6));
        assert_eq!(ranges[1], OwnershipRange::new(6, 11));
        assert_eq!(ranges[2], OwnershipRange::new(11, 16));
        assert_eq!(ranges.iter().map(OwnershipRange::len).sum::<usize>(), n);
    }

    #[test]
    fn more_processes_than_entries_leaves_empty_ranges() {
        let range = local_range(4, 5, 3).unwrap();
        assert!(range.is_empty());
        assert_eq!(range.start, 3);
    }

    #[test]
    fn to_local_offsets_by_start() {
        let range = OwnershipRange::new(6, 11);
        assert_eq!(range.to_local(6), Some(0));
        assert_eq!(range.to_local(10), Some(4));
        assert_eq!(range.to_local(11), None);
        assert_eq!(range.to_local(5), None);
    }

    #[test]
    fn serial_layout_is_not_distributed() {
        assert!(!Layout::serial(9).is_distributed());
        assert!(Layout::distributed(9, 1, 3).unwrap().is_distributed());
        // One process owning everything behaves like serial
        assert!(!Layout::distributed(9, 0, 1).unwrap().is_distributed());
    }

    #[test]
    fn distributed_layout_rejects_bad_rank() {
        assert!(matches!(
            Layout::distributed(9, 3, 3),
            Err(LaError::InvalidLayout(_))
        ));
        assert!(Layout::distributed(9, 0, 0).is_err());
    }

    #[test]
    fn zero_processes_is_an_error() {
        assert_eq!(
            local_range(0, 0, 16),
            Err(LaError::InvalidLayout(
                "number of processes must be positive".into()
            ))
        );
        assert!(local_range(2, 2, 16).is_err());
    }
}
