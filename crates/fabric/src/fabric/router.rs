//! Completion router and per-client completion queues.
//!
//! Read data returns from the shared resource as an untagged word stream.
//! The router reconstructs ownership from grant order: each read grant
//! appends an `(client, remaining)` record, and completions consume the
//! front record one word at a time. This relies on the resource's FIFO
//! contract (completions arrive in grant order); a word with no outstanding
//! record is a fatal protocol violation, never a guess.

use std::collections::VecDeque;

use tracing::{error, warn};

use crate::common::{ClientId, FabricError, FabricResult, Word};

/// One outstanding read grant awaiting its completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GrantRecord {
    /// Client the grant was issued to.
    client: ClientId,
    /// Completions still owed for this grant.
    remaining: usize,
}

/// Demultiplexes the resource's completion stream back to clients.
#[derive(Debug, Default)]
pub struct CompletionRouter {
    pending: VecDeque<GrantRecord>,
}

impl CompletionRouter {
    /// Creates a router with no outstanding grants.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Records a read grant owing `reads` completions.
    pub fn on_grant(&mut self, client: ClientId, reads: usize) {
        debug_assert!(reads > 0, "write-only grants carry no completions");
        self.pending.push_back(GrantRecord {
            client,
            remaining: reads,
        });
    }

    /// Returns the number of grants still awaiting completions.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Attributes one completion word to its owning client.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::ProtocolOrderViolation`] when no grant record
    /// is outstanding: the resource produced a word the grant history cannot
    /// account for. Debug builds assert; release builds surface the error.
    pub fn on_completion(&mut self, data: Word) -> FabricResult<(ClientId, Word)> {
        let Some(front) = self.pending.front_mut() else {
            debug_assert!(false, "completion with no outstanding grant");
            error!("completion with no outstanding grant");
            return Err(FabricError::ProtocolOrderViolation {
                reason: "completion arrived with no outstanding grant".to_string(),
            });
        };

        let client = front.client;
        front.remaining -= 1;
        if front.remaining == 0 {
            let _ = self.pending.pop_front();
        }
        Ok((client, data))
    }
}

/// Fixed-capacity ring buffer of completion words owned by one client.
///
/// The fabric fills it as completions route back; the client drains it.
/// Overflow here is fatal (see [`FabricError::CompletionOverflow`]): the
/// word cannot be dropped without breaking the client's sequence contract.
pub struct CompletionQueue {
    client: ClientId,
    entries: Vec<Word>,
    head: usize,
    tail: usize,
    count: usize,
}

impl CompletionQueue {
    /// Creates a completion queue for `client` with power-of-two capacity.
    pub fn new(client: ClientId, capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            client,
            entries: vec![0; capacity],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the capacity in words.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current occupancy in words.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no completions are waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if one more completion would overflow.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Stores one routed completion word.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::CompletionOverflow`] when the queue is full:
    /// the client failed to keep its acknowledgment rate above its issue
    /// rate, and the session cannot continue.
    pub fn push(&mut self, data: Word) -> FabricResult<()> {
        if self.is_full() {
            warn!(client = self.client.0, "completion queue overflow");
            return Err(FabricError::CompletionOverflow {
                client: self.client,
            });
        }
        self.entries[self.tail] = data;
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Ok(())
    }

    /// Removes and returns the oldest completion word, if any.
    pub fn pop(&mut self) -> Option<Word> {
        if self.count == 0 {
            return None;
        }
        let data = self.entries[self.head];
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        Some(data)
    }
}
