use std::fmt::Debug;

use crate::error::{MatrixError, Result};
use crate::kernel::reference_multiply;
use crate::matrix::Matrix;

/// Trait for pluggable multiply engines (serial, shared-memory, distributed).
///
/// An engine owns no state between runs: every call to [`multiply`]
/// sets up its workers, computes C = A × B, and tears them down again.
///
/// [`multiply`]: MultiplyEngine::multiply
pub trait MultiplyEngine: Send + Sync + Debug {
    /// Error type reported by this engine.
    type Error: std::error::Error + From<MatrixError>;

    /// Returns the name of this engine (e.g. "serial", "shared").
    fn name(&self) -> &str;

    /// Compute C = A × B for square matrices of equal dimension.
    fn multiply(&self, a: &Matrix, b: &Matrix) -> std::result::Result<Matrix, Self::Error>;
}

/// Check that A and B are both N×N and return N.
pub fn check_operands(a: &Matrix, b: &Matrix) -> Result<usize> {
    if a.dim() != b.dim() {
        return Err(MatrixError::DimensionMismatch {
            expected: a.dim(),
            got: b.dim(),
        });
    }
    Ok(a.dim())
}

/// Single-threaded reference engine.
#[derive(Debug, Clone, Default)]
pub struct SerialEngine;

impl SerialEngine {
    pub fn new() -> Self {
        SerialEngine
    }
}

impl MultiplyEngine for SerialEngine {
    type Error = MatrixError;

    fn name(&self) -> &str {
        "serial"
    }

    fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        reference_multiply(a, b)
    }
}
