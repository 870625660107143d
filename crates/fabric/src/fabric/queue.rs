//! Client request queue.
//!
//! One queue per client buffers that client's pending word-level requests
//! until the burst former can consume them. The queue provides:
//! 1. **Enqueue:** Assigns the per-client sequence number and reports
//!    overflow when the client ignores backpressure.
//! 2. **Dequeue:** Hands requests to the burst former in enqueue order.
//! 3. **Frame edges:** Carries the client's frame-boundary signal in-band,
//!    sampled with each word exactly as the hardware samples `frame_active`.
//! 4. **Latches:** Sticky overflow/underflow diagnostics, cleared only
//!    explicitly.

use tracing::warn;

use crate::common::{Access, ClientId, FabricError, FabricResult, Request, SeqNo};

/// A queued request plus the frame edges sampled when it was enqueued.
///
/// `starts_frame` marks the first word after the client asserted its frame;
/// `ends_frame` marks the last word before it deasserted. The markers travel
/// through the ring with the word, so frame boundaries stay ordered relative
/// to the data no matter how ticks interleave with client calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedRequest {
    /// The request itself.
    pub req: Request,
    /// This word opens the client's frame.
    pub starts_frame: bool,
    /// This word closes the client's frame.
    pub ends_frame: bool,
}

/// Fixed-capacity ring buffer of pending requests for one client.
///
/// Capacity is a power of two. The queue is exclusively owned by its client
/// slot; the fabric drains it from the front, the client fills it from the
/// back. Overflow and underflow set sticky latches rather than corrupting
/// the ring.
pub struct RequestQueue {
    client: ClientId,
    entries: Vec<Option<QueuedRequest>>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be enqueued.
    tail: usize,
    /// Number of occupied entries.
    count: usize,
    /// Next sequence number to assign.
    next_seq: u64,
    overflow: bool,
    underflow: bool,
}

impl RequestQueue {
    /// Creates a queue for `client` with the given power-of-two capacity.
    pub fn new(client: ClientId, capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            client,
            entries,
            head: 0,
            tail: 0,
            count: 0,
            next_seq: 0,
            overflow: false,
            underflow: false,
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

    /// Returns true if no requests are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the queue cannot accept another request.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns the sticky overflow latch.
    #[inline]
    pub fn overflow(&self) -> bool {
        self.overflow
    }

    /// Returns the sticky underflow latch.
    #[inline]
    pub fn underflow(&self) -> bool {
        self.underflow
    }

    /// Enqueues one access, assigning its sequence number.
    ///
    /// `starts_frame` carries the client's frame-assert edge in-band with
    /// the word.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::RequestOverflow`] and sets the sticky overflow
    /// latch when the queue is full. The request is not stored; the ring and
    /// every other client remain intact.
    pub fn enqueue(&mut self, access: Access, starts_frame: bool) -> FabricResult<SeqNo> {
        if self.is_full() {
            if !self.overflow {
                warn!(client = self.client.0, "request queue overflow latched");
            }
            self.overflow = true;
            return Err(FabricError::RequestOverflow {
                client: self.client,
            });
        }

        let seq = SeqNo(self.next_seq);
        self.next_seq += 1;
        self.entries[self.tail] = Some(QueuedRequest {
            req: Request {
                client: self.client,
                seq,
                access,
            },
            starts_frame,
            ends_frame: false,
        });
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Ok(seq)
    }

    /// Marks the most recently enqueued word as the last of its frame.
    ///
    /// Returns `false` when the queue is empty, in which case the caller
    /// must close the frame at the burst former instead (the frame's words
    /// have already left the queue).
    pub fn mark_frame_end(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        let newest = (self.tail + self.entries.len() - 1) % self.entries.len();
        if let Some(entry) = self.entries[newest].as_mut() {
            entry.ends_frame = true;
        }
        true
    }

    /// Returns the oldest pending entry without removing it.
    pub fn peek(&self) -> Option<&QueuedRequest> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.head].as_ref()
    }

    /// Removes and returns the oldest pending request.
    ///
    /// Popping an empty queue is the software analogue of asserting read
    /// enable on an empty FIFO: it returns `None` and sets the sticky
    /// underflow latch. The fabric core checks occupancy first and never
    /// trips this path itself.
    pub fn dequeue_for_burst(&mut self) -> Option<QueuedRequest> {
        if self.count == 0 {
            if !self.underflow {
                warn!(client = self.client.0, "request queue underflow latched");
            }
            self.underflow = true;
            return None;
        }

        let taken = self.entries[self.head].take();
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        debug_assert!(taken.is_some());
        taken
    }

    /// Clears both sticky latches.
    pub fn clear_latches(&mut self) {
        self.overflow = false;
        self.underflow = false;
    }
}
