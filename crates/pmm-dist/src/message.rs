use std::fmt;

/// Index of an execution unit within a world.
pub type Rank = usize;

/// Rank of the unit that distributes work and assembles C.
pub const COORDINATOR: Rank = 0;

/// Direction marker carried by every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    FromCoordinator,
    FromWorker,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::FromCoordinator => write!(f, "from-coordinator"),
            Tag::FromWorker => write!(f, "from-worker"),
        }
    }
}

/// A single point-to-point message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A row offset or row count.
    Count(usize),
    /// A run of matrix values in row-major order.
    Values(Vec<f64>),
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Count(_) => "count",
            Message::Values(_) => "values",
        }
    }
}

/// A message together with its tag, as it travels over a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub tag: Tag,
    pub message: Message,
}
