use pmm_core::MatrixError;
use thiserror::Error;

use crate::message::Rank;

#[derive(Error, Debug)]
pub enum DistError {
    #[error("need at least two execution units, got {available}")]
    InsufficientUnits { available: usize },
    #[error("rank {rank} out of range for world of size {size}")]
    InvalidRank { rank: Rank, size: usize },
    #[error("channel with rank {peer} is disconnected")]
    Disconnected { peer: Rank },
    #[error("protocol violation on channel with rank {peer}: {reason}")]
    Protocol { peer: Rank, reason: String },
    #[error("worker {rank} panicked")]
    WorkerPanicked { rank: Rank },
    #[error("failed to spawn execution unit: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

impl DistError {
    pub(crate) fn protocol(peer: Rank, reason: impl Into<String>) -> Self {
        DistError::Protocol {
            peer,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DistError>;
