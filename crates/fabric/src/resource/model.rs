//! Word-addressed reference RAM model.
//!
//! `ModelRam` is the bundled implementation of the resource contract: a flat
//! word store behind a latency model. Write bursts stream into the owning
//! client's region (rewinding to the region base at each frame start); read
//! bursts are priced by the latency model and released strictly in
//! submission order, which is exactly the FIFO contract the completion
//! router assumes. Readiness models both a per-burst transfer time and a
//! bounded window of buffered completions.

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::common::{Access, Burst, ClientId, FabricError, FabricResult, Word};
use crate::config::ResourceConfig;

use super::MemoryResource;
use super::latency::{self, LatencyModel};

/// A read completion waiting for its release tick.
#[derive(Clone, Copy, Debug)]
struct PendingRead {
    /// Tick at which the word becomes available.
    release_at: u64,
    /// Data captured when the read was serviced.
    data: Word,
}

/// Reference RAM resource with modeled access latency.
pub struct ModelRam {
    words: Vec<Word>,
    latency: Box<dyn LatencyModel>,
    /// Fixed setup cost charged per burst.
    base_latency: u64,
    /// Words of write region owned by each client.
    region_words: u64,
    /// Next write address per client.
    cursors: HashMap<usize, u64>,
    /// Reads serviced but not yet released, in submission order.
    pending: VecDeque<PendingRead>,
    /// Current tick.
    now: u64,
    /// Tick until which the transfer port is occupied by the last burst.
    busy_until: u64,
    /// Tick at which the latency engine can start the next read.
    service_free_at: u64,
    max_in_flight: usize,
}

impl ModelRam {
    /// Creates a model resource from the configuration.
    pub fn new(config: &ResourceConfig) -> Self {
        Self {
            words: vec![0; config.words],
            latency: latency::from_config(config),
            base_latency: config.base_latency,
            region_words: config.region_words,
            cursors: HashMap::new(),
            pending: VecDeque::new(),
            now: 0,
            busy_until: 0,
            service_free_at: 0,
            max_in_flight: config.max_in_flight,
        }
    }

    /// Returns the word capacity of the backing store.
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Returns the base address of a client's write region.
    pub fn region_base(&self, client: ClientId) -> u64 {
        client.0 as u64 * self.region_words
    }

    /// Reads a word directly, bypassing the latency model.
    ///
    /// Test and setup convenience; the data path never uses it.
    pub fn peek(&self, addr: u64) -> Option<Word> {
        self.words.get(addr as usize).copied()
    }

    /// Writes a word directly, bypassing the latency model.
    pub fn poke(&mut self, addr: u64, data: Word) {
        if let Some(slot) = self.words.get_mut(addr as usize) {
            *slot = data;
        }
    }

    fn fault(addr: u64) -> FabricError {
        FabricError::ResourceFault {
            reason: format!("word address {addr:#x} out of range"),
        }
    }
}

impl MemoryResource for ModelRam {
    fn name(&self) -> &str {
        "MODEL_RAM"
    }

    fn ready(&self) -> bool {
        self.now >= self.busy_until && self.pending.len() < self.max_in_flight
    }

    fn submit(&mut self, burst: Burst) -> FabricResult<()> {
        debug_assert!(self.ready(), "burst submitted while not ready");

        // Transfer time: setup plus one tick per valid word.
        self.busy_until = self.now + self.base_latency + burst.len() as u64;

        let region_base = self.region_base(burst.client);
        if burst.start {
            let _ = self.cursors.insert(burst.client.0, region_base);
        }

        for req in burst.requests() {
            match req.access {
                Access::Write { data } => {
                    let cursor = self.cursors.entry(burst.client.0).or_insert(region_base);
                    let addr = *cursor;
                    let Some(slot) = self.words.get_mut(addr as usize) else {
                        return Err(Self::fault(addr));
                    };
                    *slot = data;
                    *cursor += 1;
                }
                Access::Read { addr } => {
                    let Some(&data) = self.words.get(addr as usize) else {
                        return Err(Self::fault(addr));
                    };
                    let start = self.service_free_at.max(self.now + self.base_latency);
                    let release_at = start + self.latency.access_latency(addr);
                    self.service_free_at = release_at;
                    self.pending.push_back(PendingRead { release_at, data });
                }
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.now += 1;
    }

    fn complete(&mut self) -> Option<Word> {
        let front = self.pending.front()?;
        if front.release_at > self.now {
            return None;
        }
        self.pending.pop_front().map(|p| p.data)
    }
}
