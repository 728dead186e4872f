use std::thread;

use pmm_core::engine::check_operands;
use pmm_core::{Matrix, MultiplyEngine};
use tracing::{info, warn};

use crate::coordinator::Coordinator;
use crate::error::{DistError, Result};
use crate::transport::{Communicator, LocalWorld};
use crate::worker::Worker;

/// Message-passing engine with one coordinator and `units - 1` workers.
///
/// Each call builds a fresh [`LocalWorld`], runs every worker on its own
/// scoped thread with nothing but its communicator, and uses the calling
/// thread as the coordinator. Nothing outlives the call.
#[derive(Debug, Clone)]
pub struct DistributedEngine {
    units: usize,
}

impl DistributedEngine {
    /// Create an engine over `units` execution units, coordinator included.
    ///
    /// # Errors
    /// Returns [`DistError::InsufficientUnits`] if `units < 2`.
    pub fn new(units: usize) -> Result<Self> {
        if units < 2 {
            return Err(DistError::InsufficientUnits { available: units });
        }
        Ok(DistributedEngine { units })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn workers(&self) -> usize {
        self.units - 1
    }
}

impl MultiplyEngine for DistributedEngine {
    type Error = DistError;

    fn name(&self) -> &str {
        "distributed"
    }

    fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let n = check_operands(a, b)?;
        info!(n, units = self.units, "distributed multiply");

        let mut world = LocalWorld::create(self.units).into_iter();
        let coordinator_comm = world
            .next()
            .ok_or(DistError::InsufficientUnits { available: 0 })?;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers());
            let mut spawn_error = None;
            for comm in world {
                let rank = comm.rank();
                let spawned = thread::Builder::new()
                    .name(format!("pmm-worker-{rank}"))
                    .spawn_scoped(scope, move || Worker::new(comm, n).run());
                match spawned {
                    Ok(handle) => handles.push((rank, handle)),
                    Err(e) => {
                        spawn_error = Some(e);
                        break;
                    }
                }
            }

            // The coordinator's communicator is consumed here either way, so
            // any worker still waiting on it sees a disconnect rather than
            // blocking the scope forever.
            let outcome = match spawn_error {
                Some(e) => {
                    drop(coordinator_comm);
                    Err(DistError::Spawn(e))
                }
                None => Coordinator::new(coordinator_comm).and_then(|c| c.run(a, b)),
            };

            let mut worker_error: Option<DistError> = None;
            for (rank, handle) in handles {
                let result = handle
                    .join()
                    .unwrap_or(Err(DistError::WorkerPanicked { rank }));
                if let Err(e) = result {
                    warn!(rank, error = %e, "worker failed");
                    worker_error.get_or_insert(e);
                }
            }

            resolve(outcome, worker_error)
        })
    }
}

/// Pick the error that best explains a failed run.
///
/// A coordinator that lost its channel is reporting a symptom; the worker
/// error behind it is more useful.
fn resolve(outcome: Result<Matrix>, worker_error: Option<DistError>) -> Result<Matrix> {
    match (outcome, worker_error) {
        (Ok(c), None) => Ok(c),
        (Ok(_), Some(e)) => Err(e),
        (Err(DistError::Disconnected { .. }), Some(e)) => Err(e),
        (Err(e), _) => Err(e),
    }
}
