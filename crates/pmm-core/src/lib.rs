//! `pmm-core` - Dense square matrix multiply building blocks.
//!
//! This crate provides:
//! - A flat, row-major `Matrix` type
//! - The row `Partition` planner shared by every parallel engine
//! - Dense multiply kernels over row blocks, plus a reference multiply
//! - A `MultiplyEngine` trait with serial and shared-memory implementations

pub mod engine;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod partition;
pub mod shared;

// Re-export primary types at the crate root for convenience.
pub use engine::{MultiplyEngine, SerialEngine};
pub use error::{MatrixError, Result};
pub use kernel::{multiply_rows_accumulate, multiply_rows_dot, reference_multiply};
pub use matrix::Matrix;
pub use partition::{plan, Partition, WorkAssignment};
pub use shared::{Schedule, SharedConfig, SharedMemoryEngine};
