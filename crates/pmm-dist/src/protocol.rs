//! The ordered per-channel handshake.
//!
//! A row block always travels as three messages on one channel: the row
//! offset, the row count, then `rows * n` values. Work sent to a worker is
//! followed by a fourth message carrying the whole of B. [`Handshake`]
//! tracks where a receiver is in that sequence and rejects anything that
//! arrives out of order or with the wrong shape.

use pmm_core::Partition;
use tracing::trace;

use crate::error::{DistError, Result};
use crate::message::{Message, Rank, Tag};
use crate::transport::Communicator;

/// Position within the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitOffset,
    AwaitRowCount,
    AwaitPayload,
    /// Waiting for the full B matrix (worker side only).
    AwaitOperand,
    Done,
}

/// A contiguous block of rows together with where it belongs.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBlock {
    pub partition: Partition,
    pub values: Vec<f64>,
}

/// Everything a completed handshake delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub block: RowBlock,
    /// The full B matrix, present only for worker-side handshakes.
    pub operand: Option<Vec<f64>>,
}

/// Receiver-side state machine for one channel.
#[derive(Debug)]
pub struct Handshake {
    n: usize,
    peer: Rank,
    expects_operand: bool,
    state: HandshakeState,
    offset: usize,
    rows: usize,
    values: Vec<f64>,
    operand: Option<Vec<f64>>,
}

impl Handshake {
    fn new(n: usize, peer: Rank, expects_operand: bool) -> Self {
        Handshake {
            n,
            peer,
            expects_operand,
            state: HandshakeState::AwaitOffset,
            offset: 0,
            rows: 0,
            values: Vec::new(),
            operand: None,
        }
    }

    /// Handshake for a worker receiving its A rows plus B from `peer`.
    pub fn for_worker(n: usize, peer: Rank) -> Self {
        Handshake::new(n, peer, true)
    }

    /// Handshake for the coordinator receiving result rows from `peer`.
    pub fn for_collect(n: usize, peer: Rank) -> Self {
        Handshake::new(n, peer, false)
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    fn unexpected(&self, expected: &str, got: &Message) -> DistError {
        DistError::protocol(
            self.peer,
            format!("expected {expected}, got {} in state {:?}", got.kind(), self.state),
        )
    }

    /// Feed the next message on the channel and return the new state.
    pub fn accept(&mut self, message: Message) -> Result<HandshakeState> {
        let n = self.n;
        self.state = match (self.state, message) {
            (HandshakeState::AwaitOffset, Message::Count(offset)) => {
                if offset > n {
                    return Err(DistError::protocol(
                        self.peer,
                        format!("offset {offset} exceeds matrix dimension {n}"),
                    ));
                }
                self.offset = offset;
                HandshakeState::AwaitRowCount
            }
            (HandshakeState::AwaitRowCount, Message::Count(rows)) => {
                if rows > n - self.offset {
                    return Err(DistError::protocol(
                        self.peer,
                        format!(
                            "rows {}..{} exceed matrix dimension {n}",
                            self.offset,
                            self.offset + rows
                        ),
                    ));
                }
                self.rows = rows;
                HandshakeState::AwaitPayload
            }
            (HandshakeState::AwaitPayload, Message::Values(values)) => {
                let expected = self.rows * n;
                if values.len() != expected {
                    return Err(DistError::protocol(
                        self.peer,
                        format!("payload has {} values, expected {expected}", values.len()),
                    ));
                }
                self.values = values;
                if self.expects_operand {
                    HandshakeState::AwaitOperand
                } else {
                    HandshakeState::Done
                }
            }
            (HandshakeState::AwaitOperand, Message::Values(values)) => {
                if values.len() != n * n {
                    return Err(DistError::protocol(
                        self.peer,
                        format!("operand has {} values, expected {}", values.len(), n * n),
                    ));
                }
                self.operand = Some(values);
                HandshakeState::Done
            }
            (HandshakeState::AwaitOffset, other) => return Err(self.unexpected("offset", &other)),
            (HandshakeState::AwaitRowCount, other) => {
                return Err(self.unexpected("row count", &other))
            }
            (HandshakeState::AwaitPayload, other) => return Err(self.unexpected("payload", &other)),
            (HandshakeState::AwaitOperand, other) => return Err(self.unexpected("operand", &other)),
            (HandshakeState::Done, other) => return Err(self.unexpected("nothing", &other)),
        };
        Ok(self.state)
    }

    /// Consume a completed handshake.
    pub fn finish(self) -> Result<Delivery> {
        if self.state != HandshakeState::Done {
            return Err(DistError::protocol(
                self.peer,
                format!("handshake incomplete in state {:?}", self.state),
            ));
        }
        Ok(Delivery {
            block: RowBlock {
                partition: Partition::new(self.offset, self.rows),
                values: self.values,
            },
            operand: self.operand,
        })
    }

    /// Receive from `comm` until the handshake completes.
    pub fn drive<C: Communicator + ?Sized>(mut self, comm: &C, tag: Tag) -> Result<Delivery> {
        while self.state != HandshakeState::Done {
            let message = comm.recv(self.peer, tag)?;
            let state = self.accept(message)?;
            trace!(peer = self.peer, ?state, "handshake advanced");
        }
        self.finish()
    }
}

/// Send a row block as offset, row count, payload.
pub fn send_rows<C: Communicator + ?Sized>(
    comm: &C,
    dest: Rank,
    tag: Tag,
    partition: Partition,
    values: Vec<f64>,
) -> Result<()> {
    comm.send(dest, tag, Message::Count(partition.offset))?;
    comm.send(dest, tag, Message::Count(partition.rows))?;
    comm.send(dest, tag, Message::Values(values))
}
