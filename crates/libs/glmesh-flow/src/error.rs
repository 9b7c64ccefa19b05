use glmesh_wire::Address;

/// Failure reported by the mesh stack for an outbound message.
///
/// Timeouts are synthesized by the stack when an acknowledged message gets
/// no reply; they arrive here like any other send failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("bearer closed")]
    BearerClosed,

    #[error("node {0} is busy")]
    Busy(Address),

    #[error("no response before timeout")]
    Timeout,

    #[error("rejected: {reason}")]
    Rejected { reason: String },
}

impl TransportError {
    /// Returns `true` for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::Timeout)
    }
}

/// Why a task ended in [`crate::TaskStatus::Failed`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node answered with a non-zero status code.
    #[error("node answered with status {0:#04x}")]
    Status(u8),

    /// The task addresses an element the node does not have.
    #[error("node has no element {0}")]
    NoSuchElement(u8),
}
