use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("dimension mismatch: expected {expected}x{expected}, got {got}x{got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("{what}: expected {expected} elements, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("row range {start}..{end} out of bounds for {n}x{n} matrix")]
    RowsOutOfBounds { start: usize, end: usize, n: usize },
    #[error("cannot allocate {n}x{n} matrix")]
    Allocation { n: usize },
    #[error("partition requires at least one worker")]
    NoWorkers,
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
