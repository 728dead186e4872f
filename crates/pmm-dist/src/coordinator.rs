use pmm_core::engine::check_operands;
use pmm_core::{plan, Matrix};
use tracing::debug;

use crate::error::{DistError, Result};
use crate::message::{Message, Rank, Tag, COORDINATOR};
use crate::protocol::{send_rows, Handshake};
use crate::transport::Communicator;

/// The rank-0 role: distributes A rows and B, then assembles C.
#[derive(Debug)]
pub struct Coordinator<C: Communicator> {
    comm: C,
}

impl<C: Communicator> Coordinator<C> {
    /// Wrap the coordinator's communicator.
    ///
    /// # Errors
    /// Returns [`DistError::InsufficientUnits`] if the world has fewer than
    /// two units, and [`DistError::InvalidRank`] if `comm` is not rank 0.
    pub fn new(comm: C) -> Result<Self> {
        if comm.size() < 2 {
            return Err(DistError::InsufficientUnits {
                available: comm.size(),
            });
        }
        if comm.rank() != COORDINATOR {
            return Err(DistError::InvalidRank {
                rank: comm.rank(),
                size: comm.size(),
            });
        }
        Ok(Coordinator { comm })
    }

    /// Number of worker units.
    pub fn workers(&self) -> usize {
        self.comm.size() - 1
    }

    /// Run one distribute/collect round and return C = A × B.
    pub fn run(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let n = check_operands(a, b)?;
        let assignment = plan(n, self.workers())?;
        let mut c = Matrix::zeros(n)?;

        for (index, part) in assignment.iter().enumerate() {
            let dest: Rank = index + 1;
            debug!(dest, offset = part.offset, rows = part.rows, "distributing rows");
            send_rows(
                &self.comm,
                dest,
                Tag::FromCoordinator,
                part,
                a.rows(part.range())?.to_vec(),
            )?;
            self.comm
                .send(dest, Tag::FromCoordinator, Message::Values(b.as_slice().to_vec()))?;
        }

        for (index, expected) in assignment.iter().enumerate() {
            let source: Rank = index + 1;
            let delivery = Handshake::for_collect(n, source).drive(&self.comm, Tag::FromWorker)?;
            let block = delivery.block;
            if block.partition != expected {
                return Err(DistError::protocol(
                    source,
                    format!(
                        "returned rows {:?}, assigned {:?}",
                        block.partition.range(),
                        expected.range()
                    ),
                ));
            }
            c.rows_mut(block.partition.range())?
                .copy_from_slice(&block.values);
            debug!(source, offset = expected.offset, rows = expected.rows, "collected rows");
        }

        Ok(c)
    }
}
