//! Round-robin burst arbiter.
//!
//! Each scheduling round the arbiter selects at most one client, among those
//! holding a ready burst, to drive the shared resource. Selection is
//! round-robin anchored at the client after the previous winner, which
//! bounds every continuously-ready client's wait to one full rotation and
//! rules out starvation by a single always-ready client.
//!
//! The arbiter holds no burst data. It is a selection function plus the
//! rotating anchor; ownership of "the right to drive the resource" moves
//! with the grant itself.

use tracing::trace;

use crate::common::ClientId;

/// Round-robin grant arbiter over a fixed client population.
#[derive(Debug)]
pub struct RoundRobinArbiter {
    clients: usize,
    /// Client checked first in the next round.
    anchor: usize,
}

impl RoundRobinArbiter {
    /// Creates an arbiter for `clients` participants, anchored at client 0.
    pub fn new(clients: usize) -> Self {
        debug_assert!(clients > 0);
        Self { clients, anchor: 0 }
    }

    /// Returns the client the next round will check first.
    #[inline]
    pub fn anchor(&self) -> ClientId {
        ClientId(self.anchor)
    }

    /// Selects the winner for this round, if any.
    ///
    /// `candidates[c]` is true when client `c` holds a ready burst. The scan
    /// starts at the anchor and wraps once; the first ready client wins.
    /// Pure: the anchor moves only on [`Self::grant`].
    pub fn poll_ready(&self, candidates: &[bool]) -> Option<ClientId> {
        debug_assert_eq!(candidates.len(), self.clients);
        (0..self.clients)
            .map(|offset| (self.anchor + offset) % self.clients)
            .find(|&c| candidates[c])
            .map(ClientId)
    }

    /// Commits the round's grant and rotates the anchor past the winner.
    ///
    /// The anchor advances to `winner + 1` whether the granted burst was
    /// full or frame-flushed.
    pub fn grant(&mut self, winner: ClientId) {
        debug_assert!(winner.0 < self.clients);
        self.anchor = (winner.0 + 1) % self.clients;
        trace!(client = winner.0, next_anchor = self.anchor, "grant");
    }
}
