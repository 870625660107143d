//! Multi-client burst arbitration fabric.
//!
//! This crate implements a tick-accurate model of a shared-memory burst
//! arbiter with the following:
//! 1. **Lanes:** Per-client request queues with sticky overflow/underflow
//!    latches and in-band frame edges.
//! 2. **Burst forming:** Fixed-size bursts per client, flushed short only at
//!    frame boundaries.
//! 3. **Arbitration:** Round-robin grants over ready clients, one burst per
//!    round, honoring resource backpressure.
//! 4. **Completion routing:** Grant-order demultiplexing of the read-return
//!    stream into per-client completion queues.
//! 5. **Resource model:** A word-addressed reference RAM with fixed or
//!    row-buffer access latency.
//!
//! The fabric advances in discrete rounds: see [`Fabric::tick`] for the
//! scheduling discipline and [`config::Config`] for the geometry knobs.

/// Common types and constants (clients, requests, bursts, errors).
pub mod common;
/// Fabric configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Fabric core (queues, burst formers, arbiter, router, status).
pub mod fabric;
/// Shared resource contract, latency models, and the reference RAM.
pub mod resource;
/// Fabric statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Error taxonomy surfaced by the fabric.
pub use crate::common::{FabricError, FabricResult};
/// Core identifiers and payload types.
pub use crate::common::{Access, Burst, ClientId, Request, SeqNo, Word};
/// Main fabric type; construct with `Fabric::new` over a resource.
pub use crate::fabric::Fabric;
/// Reference resource implementation backing the CLI and tests.
pub use crate::resource::model::ModelRam;
