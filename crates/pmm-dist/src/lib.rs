//! `pmm-dist` - Message-passing matrix multiply.
//!
//! One coordinator (rank 0) sends each worker its offset, row count, and A
//! rows, followed by the whole of B; each worker multiplies its rows and
//! sends back (offset, row count, C rows). Units share nothing but the
//! [`Communicator`] they are handed.

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod message;
pub mod protocol;
pub mod transport;
pub mod worker;

pub use coordinator::Coordinator;
pub use engine::DistributedEngine;
pub use error::{DistError, Result};
pub use message::{Envelope, Message, Rank, Tag, COORDINATOR};
pub use protocol::{send_rows, Delivery, Handshake, HandshakeState, RowBlock};
pub use transport::{Communicator, LocalCommunicator, LocalWorld};
pub use worker::Worker;
