//! # Unit Components
//!
//! This module serves as the central hub for the fabric's unit tests. It
//! organizes coverage by subsystem: configuration, the scheduling core, and
//! the reference resource model.

/// Unit tests for the configuration surface.
///
/// Covers defaults, JSON deserialization, and every validation rule.
pub mod config;

/// Unit tests for the scheduling core.
///
/// This module aggregates tests for:
/// - Round-robin arbitration and starvation freedom.
/// - Frame boundary handling and burst shapes.
/// - Per-client order preservation end to end.
/// - Overflow latches and fatal fault poisoning.
pub mod fabric;

/// Unit tests for the reference resource model.
///
/// Covers write regions, latency-ordered completions, and the readiness
/// window, driven through a full fabric.
pub mod resource;
