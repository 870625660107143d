//! Per-client burst former.
//!
//! The former accumulates consecutive queued words into fixed-size bursts.
//! It provides:
//! 1. **Accumulation:** `feed` packs words in order and emits exactly when
//!    the burst fills, or early when the word closes the client's frame.
//! 2. **Flush:** `flush_on_frame_end` cuts a partial burst when the frame
//!    closes after its last word has already been fed.
//! 3. **Flags:** `start` on the first burst of a frame, `end` on the burst
//!    that closes one.
//!
//! The former is a deterministic function of the word stream and the frame
//! edges riding on it; the only state is the partial slot array and the
//! frame-active level. A completed burst is handed back to the caller, which
//! stages it until the arbiter grants it (the `Ready` hold).

use std::mem;

use crate::common::{Burst, ClientId, Request};

use super::queue::QueuedRequest;

/// Accumulates one client's words into fixed-shape bursts.
pub struct BurstFormer {
    client: ClientId,
    burst_size: usize,
    /// Partial burst under construction; always `burst_size` slots.
    slots: Vec<Option<Request>>,
    /// Number of filled slots (the `Filling(count)` state; 0 is `Empty`).
    count: usize,
    /// Level of the client's frame signal as of the last word fed.
    frame_active: bool,
    /// The accumulation under construction opened a frame.
    cur_start: bool,
}

impl BurstFormer {
    /// Creates a former for `client` emitting bursts of `burst_size` words.
    pub fn new(client: ClientId, burst_size: usize) -> Self {
        debug_assert!(burst_size > 0);
        let mut slots = Vec::with_capacity(burst_size);
        slots.resize_with(burst_size, || None);
        Self {
            client,
            burst_size,
            slots,
            count: 0,
            frame_active: false,
            cur_start: false,
        }
    }

    /// Returns the number of words accumulated so far.
    #[inline]
    pub fn fill_count(&self) -> usize {
        self.count
    }

    /// Returns true while a partial burst is under construction.
    #[inline]
    pub fn is_filling(&self) -> bool {
        self.count > 0
    }

    /// Returns the frame-active level as of the last word fed.
    #[inline]
    pub fn frame_active(&self) -> bool {
        self.frame_active
    }

    /// Feeds one word into the current accumulation.
    ///
    /// Returns the completed burst when this word fills the last slot, or a
    /// short `end`-flagged burst when the word closes the client's frame
    /// early. A full burst whose final word also closes the frame carries
    /// `end = true` as well.
    ///
    /// The caller must cut any in-progress accumulation (via
    /// [`Self::flush_on_frame_end`]) before feeding a word that opens a new
    /// frame; a burst never spans frames.
    pub fn feed(&mut self, entry: QueuedRequest) -> Option<Burst> {
        debug_assert!(self.count < self.burst_size);
        debug_assert!(
            !(entry.starts_frame && self.count > 0),
            "frame-open word fed into a non-empty accumulation"
        );

        if entry.starts_frame {
            self.frame_active = true;
        }
        if self.count == 0 {
            self.cur_start = entry.starts_frame;
        }

        self.slots[self.count] = Some(entry.req);
        self.count += 1;

        if entry.ends_frame {
            self.frame_active = false;
            return Some(self.emit(true));
        }
        if self.count == self.burst_size {
            return Some(self.emit(false));
        }
        None
    }

    /// Cuts the current accumulation because the client's frame closed with
    /// no further words in flight.
    ///
    /// Emits the partial burst with `end = true`; the unfilled slots stay
    /// `None` (defined-invalid padding). While the accumulation is empty the
    /// frame simply deactivates and nothing is emitted.
    pub fn flush_on_frame_end(&mut self) -> Option<Burst> {
        self.frame_active = false;
        if self.count == 0 {
            return None;
        }
        Some(self.emit(true))
    }

    /// Packages the accumulated slots into a burst and resets to `Empty`.
    fn emit(&mut self, end: bool) -> Burst {
        let len = self.count;
        let mut slots = Vec::with_capacity(self.burst_size);
        slots.resize_with(self.burst_size, || None);
        let slots = mem::replace(&mut self.slots, slots);
        let start = mem::take(&mut self.cur_start);
        self.count = 0;
        Burst::from_slots(self.client, start, end, slots, len)
    }
}
