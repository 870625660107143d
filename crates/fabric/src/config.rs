//! Configuration system for the arbitration fabric.
//!
//! This module defines all configuration structures used to parameterize the
//! fabric and its reference resource model. It provides:
//! 1. **Defaults:** Baseline geometry constants (clients, burst size, depths).
//! 2. **Structures:** Hierarchical config for the fabric and the resource.
//! 3. **Validation:** Power-of-two and non-zero checks with typed errors.
//!
//! Configuration is supplied as JSON (the CLI's `--config` flag) or built in
//! code with `Config::default()`.

use serde::Deserialize;

use crate::common::{FabricError, FabricResult};

/// Default configuration constants for the fabric.
///
/// These values define the baseline geometry when not explicitly overridden
/// in a JSON configuration.
mod defaults {
    /// Number of fabric clients.
    pub const CLIENTS: usize = 4;

    /// Words per burst.
    ///
    /// A burst former emits only full bursts of this size, except for the
    /// frame-end flush, which may be shorter.
    pub const BURST_SIZE: usize = 8;

    /// Request queue depth per client, in words. Must be a power of two.
    pub const FIFO_DEPTH: usize = 16;

    /// Completion queue depth per client, in words. Must be a power of two.
    ///
    /// Sizes the read-return window; a client that acknowledges slower than
    /// it issues reads will overflow this queue, which is fatal.
    pub const COMPLETION_DEPTH: usize = 32;

    /// Word capacity of the reference resource model.
    pub const RAM_WORDS: usize = 64 * 1024;

    /// Fixed per-burst setup latency of the resource, in ticks.
    pub const BASE_LATENCY: u64 = 4;

    /// CAS (column access) latency in ticks for the row-buffer model.
    pub const T_CAS: u64 = 14;

    /// RAS (row activate) latency in ticks for the row-buffer model.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in ticks for the row-buffer model.
    pub const T_PRE: u64 = 14;

    /// Words per DRAM row in the row-buffer model.
    pub const ROW_WORDS: u64 = 256;

    /// Maximum read completions the resource will buffer before
    /// deasserting `ready`.
    pub const MAX_IN_FLIGHT: usize = 64;

    /// Words of write region owned by each client in the reference model.
    pub const REGION_WORDS: u64 = 4096;
}

/// Latency model used by the reference resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum LatencyKind {
    /// Every access takes the same number of ticks.
    #[default]
    Fixed,
    /// Row-buffer-aware latency (CAS, RAS, precharge).
    #[serde(alias = "DRAM")]
    RowBuffer,
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use memfab_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.fabric.clients, 4);
/// assert_eq!(config.fabric.burst_size, 8);
/// config.validate().unwrap();
/// ```
///
/// Deserializing from JSON (typical CLI usage):
///
/// ```
/// use memfab_core::config::{Config, LatencyKind};
///
/// let json = r#"{
///     "fabric": {
///         "clients": 2,
///         "burst_size": 4,
///         "fifo_depth": 8,
///         "completion_depth": 16
///     },
///     "resource": {
///         "latency": "RowBuffer",
///         "t_cas": 10,
///         "t_ras": 12,
///         "t_pre": 8
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.fabric.clients, 2);
/// assert_eq!(config.resource.latency, LatencyKind::RowBuffer);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Fabric geometry (clients, burst size, queue depths).
    #[serde(default)]
    pub fabric: FabricConfig,
    /// Reference resource model parameters.
    #[serde(default)]
    pub resource: ResourceConfig,
}

impl Config {
    /// Checks every geometry constraint the fabric relies on.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::InvalidConfig`] naming the violated constraint:
    /// zero clients, zero burst size, non-power-of-two queue depths, a burst
    /// larger than the request queue, or a zero-capacity resource.
    pub fn validate(&self) -> FabricResult<()> {
        let f = &self.fabric;
        if f.clients == 0 {
            return Err(invalid("clients must be at least 1"));
        }
        if f.burst_size == 0 {
            return Err(invalid("burst_size must be at least 1"));
        }
        if !f.fifo_depth.is_power_of_two() {
            return Err(invalid("fifo_depth must be a power of two"));
        }
        if !f.completion_depth.is_power_of_two() {
            return Err(invalid("completion_depth must be a power of two"));
        }
        if f.burst_size > f.fifo_depth {
            return Err(invalid("burst_size must not exceed fifo_depth"));
        }
        if self.resource.words == 0 {
            return Err(invalid("resource words must be at least 1"));
        }
        if self.resource.max_in_flight == 0 {
            return Err(invalid("max_in_flight must be at least 1"));
        }
        if (f.clients as u64) * self.resource.region_words > self.resource.words as u64 {
            return Err(invalid(
                "client write regions do not fit the resource word store",
            ));
        }
        Ok(())
    }
}

/// Converts a constraint description into the typed config error.
fn invalid(reason: &str) -> FabricError {
    FabricError::InvalidConfig {
        reason: reason.to_string(),
    }
}

/// Fabric geometry configuration.
///
/// Defines the number of clients and the per-client queue and burst shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct FabricConfig {
    /// Number of clients multiplexed onto the shared resource.
    #[serde(default = "FabricConfig::default_clients")]
    pub clients: usize,

    /// Words per burst.
    #[serde(default = "FabricConfig::default_burst_size")]
    pub burst_size: usize,

    /// Request queue depth per client (power of two).
    #[serde(default = "FabricConfig::default_fifo_depth")]
    pub fifo_depth: usize,

    /// Completion queue depth per client (power of two).
    #[serde(default = "FabricConfig::default_completion_depth")]
    pub completion_depth: usize,
}

impl FabricConfig {
    /// Returns the default client count.
    fn default_clients() -> usize {
        defaults::CLIENTS
    }

    /// Returns the default burst size in words.
    fn default_burst_size() -> usize {
        defaults::BURST_SIZE
    }

    /// Returns the default request queue depth.
    fn default_fifo_depth() -> usize {
        defaults::FIFO_DEPTH
    }

    /// Returns the default completion queue depth.
    fn default_completion_depth() -> usize {
        defaults::COMPLETION_DEPTH
    }
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            clients: defaults::CLIENTS,
            burst_size: defaults::BURST_SIZE,
            fifo_depth: defaults::FIFO_DEPTH,
            completion_depth: defaults::COMPLETION_DEPTH,
        }
    }
}

/// Reference resource model configuration.
///
/// Parameterizes the word store and the latency model behind it. The fabric
/// itself never reads these; they exist for the bundled [`crate::resource`]
/// implementation.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    /// Word capacity of the backing store.
    #[serde(default = "ResourceConfig::default_words")]
    pub words: usize,

    /// Fixed per-burst setup latency in ticks.
    #[serde(default = "ResourceConfig::default_base_latency")]
    pub base_latency: u64,

    /// Which latency model serves read words.
    #[serde(default)]
    pub latency: LatencyKind,

    /// CAS latency in ticks (row-buffer model only).
    #[serde(default = "ResourceConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency in ticks (row-buffer model only).
    #[serde(default = "ResourceConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency in ticks (row-buffer model only).
    #[serde(default = "ResourceConfig::default_t_pre")]
    pub t_pre: u64,

    /// Words per row (row-buffer model only).
    #[serde(default = "ResourceConfig::default_row_words")]
    pub row_words: u64,

    /// Words of write region owned by each client.
    ///
    /// Write requests carry payload only; the resource streams them into
    /// the owning client's region, rewinding to its base at each frame
    /// start.
    #[serde(default = "ResourceConfig::default_region_words")]
    pub region_words: u64,

    /// Read completions buffered before `ready` deasserts.
    #[serde(default = "ResourceConfig::default_max_in_flight")]
    pub max_in_flight: usize,
}

impl ResourceConfig {
    /// Returns the default backing store capacity in words.
    fn default_words() -> usize {
        defaults::RAM_WORDS
    }

    /// Returns the default per-burst setup latency.
    fn default_base_latency() -> u64 {
        defaults::BASE_LATENCY
    }

    /// Returns the default CAS latency.
    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    /// Returns the default RAS latency.
    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    /// Returns the default precharge latency.
    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    /// Returns the default row width in words.
    fn default_row_words() -> u64 {
        defaults::ROW_WORDS
    }

    /// Returns the default per-client write region size.
    fn default_region_words() -> u64 {
        defaults::REGION_WORDS
    }

    /// Returns the default in-flight completion cap.
    fn default_max_in_flight() -> usize {
        defaults::MAX_IN_FLIGHT
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            words: defaults::RAM_WORDS,
            base_latency: defaults::BASE_LATENCY,
            latency: LatencyKind::default(),
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            row_words: defaults::ROW_WORDS,
            region_words: defaults::REGION_WORDS,
            max_in_flight: defaults::MAX_IN_FLIGHT,
        }
    }
}
