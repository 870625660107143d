//! Access-latency models for the reference resource.
//!
//! This module provides:
//! 1. **FixedLatency:** Same cost per access (no row-buffer modeling).
//! 2. **RowBufferLatency:** Row-buffer-aware cost (CAS, RAS, precharge) for
//!    DRAM-style timing.
//!
//! Models are `Send + Sync` for use behind the resource trait.

use crate::config::ResourceConfig;

/// Trait for latency models that price each word access in ticks.
pub trait LatencyModel: Send + Sync {
    /// Returns the number of ticks required to serve the given word address.
    fn access_latency(&mut self, addr: u64) -> u64;
}

/// Builds the latency model selected by the configuration.
pub fn from_config(config: &ResourceConfig) -> Box<dyn LatencyModel> {
    match config.latency {
        crate::config::LatencyKind::Fixed => Box::new(FixedLatency::new(config.t_cas)),
        crate::config::LatencyKind::RowBuffer => Box::new(RowBufferLatency::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
            config.row_words,
        )),
    }
}

/// Fixed-latency model; every access costs the same number of ticks.
#[derive(Debug)]
pub struct FixedLatency {
    latency: u64,
}

impl FixedLatency {
    /// Creates a fixed model with the given cost per access.
    pub fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl LatencyModel for FixedLatency {
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// Row-buffer model; prices CAS, RAS, and precharge like a DRAM bank.
#[derive(Debug)]
pub struct RowBufferLatency {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_words: u64,
}

impl RowBufferLatency {
    /// Creates a row-buffer model with the given timing parameters.
    ///
    /// `row_words` is the row width in words; accesses within the open row
    /// pay CAS only.
    pub fn new(t_cas: u64, t_ras: u64, t_pre: u64, row_words: u64) -> Self {
        debug_assert!(row_words > 0);
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_words,
        }
    }
}

impl LatencyModel for RowBufferLatency {
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr / self.row_words;
        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}
