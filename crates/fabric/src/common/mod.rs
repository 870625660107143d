//! Common types and errors shared across the fabric.
//!
//! This module collects the vocabulary used by every component. It provides:
//! 1. **Identifiers:** Client identity and per-client sequence numbers.
//! 2. **Payloads:** Word-granular requests and fixed-shape bursts.
//! 3. **Errors:** The fabric error taxonomy and result alias.

/// Fabric error taxonomy and result alias.
pub mod error;
/// Client identifiers, requests, and bursts.
pub mod types;

pub use error::{FabricError, FabricResult};
pub use types::{Access, Burst, ClientId, Request, SeqNo, Word};
