//! Client identifiers, requests, and bursts.
//!
//! These types form the data plane of the fabric. A client produces
//! word-granular [`Request`]s; the per-client burst former packs them into
//! fixed-shape [`Burst`]s; the arbiter forwards whole bursts to the shared
//! resource.

use std::fmt;

/// One bus word. The fabric moves 64-bit words end to end.
pub type Word = u64;

/// Logical identity of a fabric client (`0..clients`).
///
/// A client owns exactly one request queue, one burst former, and one
/// completion queue. Identities are fixed at construction and never migrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub usize);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client{}", self.0)
    }
}

/// Per-client sequence number, assigned when a request is enqueued.
///
/// Sequence numbers are monotonically increasing within a client and are the
/// invariant used to preserve per-client ordering through the shared
/// resource. They carry no meaning across clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SeqNo(pub u64);

/// Word-granular operation carried by a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Write one payload word to the shared resource.
    Write {
        /// Payload word.
        data: Word,
    },
    /// Read one word back from the shared resource.
    Read {
        /// Word address within the resource.
        addr: u64,
    },
}

impl Access {
    /// Returns `true` for read accesses, which produce a completion.
    #[inline]
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

/// A single word-granular request from one client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    /// Owning client.
    pub client: ClientId,
    /// Per-client sequence number (enqueue order).
    pub seq: SeqNo,
    /// The operation itself.
    pub access: Access,
}

/// A fixed-shape batch of same-client requests forwarded together.
///
/// A burst always has `capacity()` slots. The first `len()` slots hold valid
/// requests in enqueue order; the remainder are defined-invalid padding
/// (`None`) and must never be interpreted as data downstream. Only a frame
/// boundary produces a short burst (`len() < capacity()`), and such a burst
/// always carries `end = true`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Burst {
    /// Owning client.
    pub client: ClientId,
    /// First burst of the client's currently active frame.
    pub start: bool,
    /// The client's frame ends with this burst.
    pub end: bool,
    slots: Vec<Option<Request>>,
    len: usize,
}

impl Burst {
    /// Assembles a burst from a slot array whose valid prefix has `len`
    /// entries. Slots past the prefix must be `None`.
    pub(crate) fn from_slots(
        client: ClientId,
        start: bool,
        end: bool,
        slots: Vec<Option<Request>>,
        len: usize,
    ) -> Self {
        debug_assert!(len <= slots.len());
        debug_assert!(slots.iter().take(len).all(Option::is_some));
        debug_assert!(slots.iter().skip(len).all(Option::is_none));
        Self {
            client,
            start,
            end,
            slots,
            len,
        }
    }

    /// Returns the fixed slot count (the configured burst size).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of valid requests in the burst.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the burst holds no valid requests.
    ///
    /// The fabric never emits such a burst; the method exists for the
    /// `len`/`is_empty` pairing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the burst was cut short by a frame boundary.
    #[inline]
    pub fn is_short(&self) -> bool {
        self.len < self.slots.len()
    }

    /// Iterates over the valid requests in slot order.
    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.slots.iter().take(self.len).flatten()
    }

    /// Returns the number of read requests in the burst.
    ///
    /// This is the number of completions the shared resource will produce
    /// for the burst.
    pub fn read_count(&self) -> usize {
        self.requests().filter(|r| r.access.is_read()).count()
    }

    /// Returns the full slot array, padding included.
    pub fn slots(&self) -> &[Option<Request>] {
        &self.slots
    }
}
