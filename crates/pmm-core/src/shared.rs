//! Shared-memory execution engine.
//!
//! The outer row loop is split across a rayon pool built for the duration of
//! one call. Every task receives a disjoint `&mut` block of C rows, so the
//! borrow checker enforces that no two threads ever write the same row and
//! no locking is needed. A and B are shared read-only.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::engine::{check_operands, MultiplyEngine};
use crate::error::{MatrixError, Result};
use crate::kernel::multiply_rows_accumulate;
use crate::matrix::Matrix;
use crate::partition::plan;

/// How rows are handed to threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One contiguous block of rows per thread, sized by the partition planner.
    #[default]
    Static,
    /// One task per row, balanced by work stealing.
    Dynamic,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Static => write!(f, "static"),
            Schedule::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Schedule::Static),
            "dynamic" => Ok(Schedule::Dynamic),
            other => Err(format!(
                "unknown schedule '{other}', expected 'static' or 'dynamic'"
            )),
        }
    }
}

/// Configuration for [`SharedMemoryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SharedConfig {
    /// Worker thread count; `None` uses the platform's reported parallelism.
    pub threads: Option<NonZeroUsize>,
    pub schedule: Schedule,
}

impl SharedConfig {
    pub fn with_threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// The thread count a run will actually use.
    pub fn resolved_threads(&self) -> usize {
        self.threads
            .or_else(|| std::thread::available_parallelism().ok())
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    }
}

/// Thread-parallel engine over a single shared C buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedMemoryEngine {
    config: SharedConfig,
}

impl SharedMemoryEngine {
    pub fn new(config: SharedConfig) -> Self {
        SharedMemoryEngine { config }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Number of threads a call will run on.
    pub fn threads(&self) -> usize {
        self.config.resolved_threads()
    }

    /// Accumulate A × B into `c`.
    ///
    /// `c` must be N×N and is added to, not overwritten; pass a zeroed matrix
    /// for a plain product.
    pub fn multiply_into(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        let n = check_operands(a, b)?;
        if c.dim() != n {
            return Err(MatrixError::DimensionMismatch {
                expected: n,
                got: c.dim(),
            });
        }
        if n == 0 {
            return Ok(());
        }

        let threads = self.threads();
        let schedule = self.config.schedule;
        debug!(n, threads, %schedule, "shared-memory multiply");

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("pmm-shared-{i}"))
            .build()
            .map_err(|e| MatrixError::ThreadPool(e.to_string()))?;

        let (a, b, c) = (a.as_slice(), b.as_slice(), c.as_mut_slice());
        pool.install(|| match schedule {
            Schedule::Static => run_static(a, b, c, n, threads),
            Schedule::Dynamic => run_dynamic(a, b, c, n),
        })
    }
}

/// Split C into one contiguous block per thread and run each block as a task.
fn run_static(a: &[f64], b: &[f64], c: &mut [f64], n: usize, threads: usize) -> Result<()> {
    let assignment = plan(n, threads)?;

    let mut blocks = Vec::with_capacity(assignment.len());
    let mut rest = c;
    for part in assignment.iter() {
        let (block, tail) = std::mem::take(&mut rest).split_at_mut(part.rows * n);
        blocks.push((part, block));
        rest = tail;
    }

    blocks.into_par_iter().try_for_each(|(part, block)| {
        if part.is_empty() {
            return Ok(());
        }
        let a_rows = &a[part.offset * n..part.end() * n];
        multiply_rows_accumulate(a_rows, b, block, n)
    })
}

fn run_dynamic(a: &[f64], b: &[f64], c: &mut [f64], n: usize) -> Result<()> {
    c.par_chunks_mut(n)
        .enumerate()
        .try_for_each(|(i, c_row)| multiply_rows_accumulate(&a[i * n..(i + 1) * n], b, c_row, n))
}

impl MultiplyEngine for SharedMemoryEngine {
    type Error = MatrixError;

    fn name(&self) -> &str {
        "shared"
    }

    fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let mut c = Matrix::zeros(a.dim())?;
        self.multiply_into(a, b, &mut c)?;
        Ok(c)
    }
}
