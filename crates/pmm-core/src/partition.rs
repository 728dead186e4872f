//! Row partitioning of an N×N problem across P workers.
//!
//! Every worker gets `N / P` rows; the first `N % P` workers get one extra.
//! Offsets accumulate in worker order starting at 0, so the partitions tile
//! `[0, N)` exactly. When `N < P` the trailing workers receive empty
//! partitions and still take part in whatever protocol drives them.

use std::ops::Range;

use crate::error::{MatrixError, Result};

/// A contiguous row range `[offset, offset + rows)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub offset: usize,
    pub rows: usize,
}

impl Partition {
    pub fn new(offset: usize, rows: usize) -> Self {
        Partition { offset, rows }
    }

    /// One past the last row.
    pub fn end(&self) -> usize {
        self.offset + self.rows
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// The full set of partitions for one run, indexed by worker (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAssignment {
    n: usize,
    partitions: Vec<Partition>,
}

impl WorkAssignment {
    /// Matrix dimension the assignment covers.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn get(&self, worker: usize) -> Option<Partition> {
        self.partitions.get(worker).copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Partition> + '_ {
        self.partitions.iter().copied()
    }

    pub fn as_slice(&self) -> &[Partition] {
        &self.partitions
    }

    /// Sum of row counts; always equals [`dim`](Self::dim).
    pub fn total_rows(&self) -> usize {
        self.partitions.iter().map(|p| p.rows).sum()
    }
}

/// Split `n` rows across `p` workers.
///
/// # Errors
/// Returns [`MatrixError::NoWorkers`] if `p == 0`.
pub fn plan(n: usize, p: usize) -> Result<WorkAssignment> {
    if p == 0 {
        return Err(MatrixError::NoWorkers);
    }

    let averow = n / p;
    let extra = n % p;

    let mut partitions = Vec::with_capacity(p);
    let mut offset = 0;
    for worker in 0..p {
        let rows = if worker < extra { averow + 1 } else { averow };
        partitions.push(Partition::new(offset, rows));
        offset += rows;
    }

    Ok(WorkAssignment { n, partitions })
}
