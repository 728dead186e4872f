use pmm_core::MatrixError;
use pmm_dist::DistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("Matrix size must be larger than 0")]
    NonPositiveSize,
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
    #[error("distributed run failed: {0}")]
    Dist(#[from] DistError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Bad arguments and an undersized world are configuration errors (1);
    /// anything that fails once the multiply has started is 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_)
            | CliError::NonPositiveSize
            | CliError::Dist(DistError::InsufficientUnits { .. }) => 1,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
