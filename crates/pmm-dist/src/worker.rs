use pmm_core::{multiply_rows_dot, Partition};
use tracing::debug;

use crate::error::{DistError, Result};
use crate::message::{Tag, COORDINATOR};
use crate::protocol::{send_rows, Handshake};
use crate::transport::Communicator;

/// A non-zero rank: multiplies the rows it is sent and returns them.
#[derive(Debug)]
pub struct Worker<C: Communicator> {
    comm: C,
    n: usize,
}

impl<C: Communicator> Worker<C> {
    pub fn new(comm: C, n: usize) -> Self {
        Worker { comm, n }
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    /// Receive one block, multiply it, and send the result back.
    ///
    /// Returns the partition that was processed. An empty partition still
    /// goes through the full exchange.
    pub fn run(&self) -> Result<Partition> {
        let delivery =
            Handshake::for_worker(self.n, COORDINATOR).drive(&self.comm, Tag::FromCoordinator)?;
        let block = delivery.block;
        let b = delivery
            .operand
            .ok_or_else(|| DistError::protocol(COORDINATOR, "missing B operand"))?;

        let mut c_rows = vec![0.0; block.values.len()];
        multiply_rows_dot(&block.values, &b, &mut c_rows, self.n)?;
        debug!(
            rank = self.rank(),
            offset = block.partition.offset,
            rows = block.partition.rows,
            "block multiplied"
        );

        send_rows(
            &self.comm,
            COORDINATOR,
            Tag::FromWorker,
            block.partition,
            c_rows,
        )?;
        Ok(block.partition)
    }
}
