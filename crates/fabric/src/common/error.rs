//! Fabric error taxonomy.
//!
//! Every failure the fabric can surface is listed here. The taxonomy follows
//! the flow-control contract: per-client queue overflow is local and sticky,
//! completion-side failures are fatal to the offending client's session, and
//! an ordering violation by the shared resource is fatal to the whole run.
//! The fabric never retries anything; retry policy belongs to the client.

use thiserror::Error;

use super::types::ClientId;

/// Result alias used across the fabric.
pub type FabricResult<T> = Result<T, FabricError>;

/// Errors surfaced by the fabric and its collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FabricError {
    /// A client issued a request while its request queue was full.
    ///
    /// This means the client ignored backpressure. The condition is local to
    /// the offending client: its sticky overflow latch is set and the data
    /// path continues for everyone else.
    #[error("{client}: request enqueued while queue full (backpressure ignored)")]
    RequestOverflow {
        /// The client whose queue overflowed.
        client: ClientId,
    },

    /// A completion arrived for a client whose completion queue was full.
    ///
    /// Dropping the completion would desynchronize the client's sequence
    /// numbering irrecoverably, so this is fatal to the session.
    #[error("{client}: completion arrived while completion queue full")]
    CompletionOverflow {
        /// The client whose completion queue overflowed.
        client: ClientId,
    },

    /// The shared resource delivered a completion out of grant order, or one
    /// that no outstanding grant accounts for.
    ///
    /// The resource-side FIFO ordering contract is assumed, not enforced, so
    /// a violation indicates a broken collaborator and is unrecoverable.
    #[error("protocol order violation: {reason}")]
    ProtocolOrderViolation {
        /// What the router observed.
        reason: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated.
        reason: String,
    },

    /// The downstream resource rejected a submitted burst.
    #[error("resource fault: {reason}")]
    ResourceFault {
        /// What the resource reported.
        reason: String,
    },
}

impl FabricError {
    /// Returns `true` for faults that poison the whole fabric rather than a
    /// single client's latches.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CompletionOverflow { .. }
                | Self::ProtocolOrderViolation { .. }
                | Self::ResourceFault { .. }
        )
    }
}
