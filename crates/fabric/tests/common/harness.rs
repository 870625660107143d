//! Config builders and frame-pumping helpers.
//!
//! The helpers drive a fabric the way a well-behaved client would: they
//! watch occupancy and interleave ticks instead of ramming words into a
//! full queue, so tests only see overflow when they ask for it.

use memfab_core::common::{ClientId, Word};
use memfab_core::config::Config;
use memfab_core::fabric::Fabric;
use memfab_core::resource::MemoryResource;

use super::mocks::resource::ScriptedResource;

/// Builds a validated config with the given fabric geometry and default
/// resource parameters.
pub fn geometry(clients: usize, burst_size: usize, fifo_depth: usize) -> Config {
    let mut config = Config::default();
    config.fabric.clients = clients;
    config.fabric.burst_size = burst_size;
    config.fabric.fifo_depth = fifo_depth;
    config.validate().expect("test geometry must validate");
    config
}

/// Builds a fabric over an always-ready scripted resource.
pub fn mock_fabric(config: &Config) -> Fabric<ScriptedResource> {
    Fabric::new(config, ScriptedResource::always_ready()).expect("config validated")
}

/// Enqueues one write, ticking through backpressure instead of overflowing.
///
/// Panics if the queue stays full for `max_ticks` rounds.
pub fn write_backpressured<R: MemoryResource>(
    fabric: &mut Fabric<R>,
    config: &Config,
    client: ClientId,
    data: Word,
    max_ticks: u64,
) {
    for _ in 0..max_ticks {
        if fabric.status(client).fifo_occupancy < config.fabric.fifo_depth {
            let _ = fabric.enqueue_write(client, data).expect("queue has room");
            return;
        }
        fabric.tick().expect("tick during backpressure");
    }
    panic!("{client} queue never drained below capacity");
}

/// Enqueues one read, ticking through backpressure instead of overflowing.
pub fn read_backpressured<R: MemoryResource>(
    fabric: &mut Fabric<R>,
    config: &Config,
    client: ClientId,
    addr: u64,
    max_ticks: u64,
) {
    for _ in 0..max_ticks {
        if fabric.status(client).fifo_occupancy < config.fabric.fifo_depth {
            let _ = fabric.enqueue_read(client, addr).expect("queue has room");
            return;
        }
        fabric.tick().expect("tick during backpressure");
    }
    panic!("{client} queue never drained below capacity");
}

/// Pumps a whole write frame through, honoring backpressure.
pub fn write_frame<R: MemoryResource>(
    fabric: &mut Fabric<R>,
    config: &Config,
    client: ClientId,
    words: &[Word],
) {
    fabric.begin_frame(client);
    for &data in words {
        write_backpressured(fabric, config, client, data, 10_000);
    }
    fabric.end_frame(client);
}

/// Ticks until `expected` words have been submitted downstream in total.
///
/// Panics if the budget runs out first.
pub fn run_until_submitted<R: MemoryResource>(
    fabric: &mut Fabric<R>,
    expected: u64,
    max_ticks: u64,
) {
    for _ in 0..max_ticks {
        if fabric.stats().words_submitted >= expected {
            return;
        }
        fabric.tick().expect("tick while draining");
    }
    panic!(
        "only {} of {expected} words submitted within {max_ticks} ticks",
        fabric.stats().words_submitted
    );
}

/// Ticks until `client` has yielded `expected` completions, collecting them.
///
/// Panics if the budget runs out first.
pub fn drain_completions<R: MemoryResource>(
    fabric: &mut Fabric<R>,
    client: ClientId,
    expected: usize,
    max_ticks: u64,
) -> Vec<Word> {
    let mut got = Vec::with_capacity(expected);
    for _ in 0..max_ticks {
        while let Some(word) = fabric.take_completion(client) {
            got.push(word);
        }
        if got.len() >= expected {
            return got;
        }
        fabric.tick().expect("tick while draining completions");
    }
    panic!(
        "only {} of {expected} completions for {client} within {max_ticks} ticks",
        got.len()
    );
}
