//! Point-to-point transport between execution units.
//!
//! [`Communicator`] is the seam the coordinator and worker roles talk
//! through. [`LocalWorld`] implements it in-process on top of
//! [`crossbeam_channel`]: every ordered (source, destination) pair gets its
//! own unbounded channel, so messages between one pair arrive in send order
//! while nothing is ordered across pairs.

use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{DistError, Result};
use crate::message::{Envelope, Message, Rank, Tag};

/// Blocking, tagged, point-to-point messaging for one execution unit.
pub trait Communicator: Send {
    /// This unit's rank.
    fn rank(&self) -> Rank;

    /// Total number of units in the world, coordinator included.
    fn size(&self) -> usize;

    /// Post `message` to `dest`.
    fn send(&self, dest: Rank, tag: Tag, message: Message) -> Result<()>;

    /// Block until the next message from `source` arrives.
    ///
    /// The message must carry `tag`; anything else is a protocol violation.
    fn recv(&self, source: Rank, tag: Tag) -> Result<Message>;
}

/// Factory for a set of connected in-process communicators.
pub struct LocalWorld;

impl LocalWorld {
    /// Create `size` communicators, one per rank, fully connected.
    ///
    /// Dropping a communicator closes all of its outbound channels; peers
    /// blocked on it observe [`DistError::Disconnected`].
    pub fn create(size: usize) -> Vec<LocalCommunicator> {
        let mut outbound: Vec<Vec<Sender<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut inbound: Vec<Vec<Receiver<Envelope>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = unbounded();
                outbound[src].push(tx);
                inbound[dst].push(rx);
            }
        }

        outbound
            .into_iter()
            .zip(inbound)
            .enumerate()
            .map(|(rank, (outbound, inbound))| LocalCommunicator {
                rank,
                size,
                outbound,
                inbound,
            })
            .collect()
    }
}

/// One rank's endpoint in a [`LocalWorld`].
pub struct LocalCommunicator {
    rank: Rank,
    size: usize,
    /// `outbound[d]` carries messages from this rank to rank `d`.
    outbound: Vec<Sender<Envelope>>,
    /// `inbound[s]` carries messages from rank `s` to this rank.
    inbound: Vec<Receiver<Envelope>>,
}

impl fmt::Debug for LocalCommunicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCommunicator")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl LocalCommunicator {
    fn check_rank(&self, rank: Rank) -> Result<()> {
        if rank >= self.size {
            return Err(DistError::InvalidRank {
                rank,
                size: self.size,
            });
        }
        Ok(())
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: Rank, tag: Tag, message: Message) -> Result<()> {
        self.check_rank(dest)?;
        self.outbound[dest]
            .send(Envelope { tag, message })
            .map_err(|_| DistError::Disconnected { peer: dest })
    }

    fn recv(&self, source: Rank, tag: Tag) -> Result<Message> {
        self.check_rank(source)?;
        let envelope = self.inbound[source]
            .recv()
            .map_err(|_| DistError::Disconnected { peer: source })?;
        if envelope.tag != tag {
            return Err(DistError::protocol(
                source,
                format!("expected tag {tag}, got {}", envelope.tag),
            ));
        }
        Ok(envelope.message)
    }
}
