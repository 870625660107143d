//! `ModelRam` end-to-end tests.
//!
//! Drives the reference resource through a full fabric: write frames land
//! in the owning client's region, read frames come back in order through
//! the latency model, and the bounded completion window backpressures the
//! arbiter.

use memfab_core::common::ClientId;
use memfab_core::config::{Config, LatencyKind};
use memfab_core::fabric::Fabric;
use memfab_core::resource::model::ModelRam;

use crate::common::harness::{drain_completions, run_until_submitted, write_frame};

fn small_config() -> Config {
    let mut config = Config::default();
    config.fabric.clients = 2;
    config.fabric.burst_size = 4;
    config.fabric.fifo_depth = 16;
    config.resource.words = 1024;
    config.resource.region_words = 256;
    config.resource.base_latency = 1;
    config.resource.t_cas = 2;
    config.validate().unwrap();
    config
}

fn ram_fabric(config: &Config) -> Fabric<ModelRam> {
    Fabric::new(config, ModelRam::new(&config.resource)).unwrap()
}

#[test]
fn write_frame_lands_in_client_region() {
    let config = small_config();
    let mut fabric = ram_fabric(&config);

    let words: Vec<u64> = (0..10).map(|i| 500 + i).collect();
    write_frame(&mut fabric, &config, ClientId(1), &words);
    run_until_submitted(&mut fabric, 10, 1000);
    fabric.run(20).unwrap();

    let ram = fabric.resource();
    let base = ram.region_base(ClientId(1));
    for (i, &want) in words.iter().enumerate() {
        assert_eq!(ram.peek(base + i as u64), Some(want), "word {i}");
    }
}

#[test]
fn read_back_own_region_through_latency_model() {
    let config = small_config();
    let mut fabric = ram_fabric(&config);
    let c0 = ClientId(0);

    let words: Vec<u64> = (0..8).map(|i| 900 + i).collect();
    write_frame(&mut fabric, &config, c0, &words);
    run_until_submitted(&mut fabric, 8, 1000);
    fabric.run(20).unwrap();

    let base = fabric.resource().region_base(c0);
    fabric.begin_frame(c0);
    for i in 0..8u64 {
        let _ = fabric.enqueue_read(c0, base + i).unwrap();
    }
    fabric.end_frame(c0);

    let got = drain_completions(&mut fabric, c0, 8, 2000);
    assert_eq!(got, words);
}

#[test]
fn row_buffer_model_serves_reads_in_order() {
    let mut config = small_config();
    config.resource.latency = LatencyKind::RowBuffer;
    config.resource.t_cas = 3;
    config.resource.t_ras = 5;
    config.resource.t_pre = 4;
    config.resource.row_words = 8;
    let mut fabric = ram_fabric(&config);
    let c0 = ClientId(0);

    for addr in 0..16u64 {
        fabric.resource_mut().poke(addr, 3000 + addr);
    }
    fabric.begin_frame(c0);
    // Alternate rows to force conflicts; order must still hold.
    for addr in [0u64, 8, 1, 9, 2, 10] {
        let _ = fabric.enqueue_read(c0, addr).unwrap();
    }
    fabric.end_frame(c0);

    let got = drain_completions(&mut fabric, c0, 6, 5000);
    let want: Vec<u64> = [0u64, 8, 1, 9, 2, 10].iter().map(|a| 3000 + a).collect();
    assert_eq!(got, want);
}

/// With a tiny in-flight window the resource deasserts `ready` until
/// completions drain, stalling further grants instead of losing words.
#[test]
fn bounded_window_backpressures_grants() {
    let mut config = small_config();
    config.resource.max_in_flight = 2;
    config.resource.t_cas = 20;
    let mut fabric = ram_fabric(&config);
    let c0 = ClientId(0);

    fabric.begin_frame(c0);
    for addr in 0..12u64 {
        let _ = fabric.enqueue_read(c0, addr).unwrap();
    }
    fabric.end_frame(c0);

    let got = drain_completions(&mut fabric, c0, 12, 10_000);
    assert_eq!(got.len(), 12);
    assert!(
        fabric.stats().resource_stalls > 0,
        "window must have stalled at least one round"
    );
}
