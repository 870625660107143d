//! Configuration validation tests.
//!
//! Verifies defaults, partial JSON deserialization, and each geometry rule
//! in `Config::validate`.

use memfab_core::common::FabricError;
use memfab_core::config::{Config, LatencyKind};
use rstest::rstest;

#[test]
fn defaults_validate() {
    Config::default().validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let json = r#"{ "fabric": { "clients": 2 } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.fabric.clients, 2);
    assert_eq!(config.fabric.burst_size, 8);
    assert_eq!(config.resource.latency, LatencyKind::Fixed);
    config.validate().unwrap();
}

#[test]
fn latency_kind_aliases() {
    let json = r#"{ "resource": { "latency": "DRAM" } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.resource.latency, LatencyKind::RowBuffer);
}

/// Applies one geometry mutation and expects validation to reject it.
#[rstest]
#[case::zero_clients(|c: &mut Config| c.fabric.clients = 0)]
#[case::zero_burst(|c: &mut Config| c.fabric.burst_size = 0)]
#[case::fifo_not_pow2(|c: &mut Config| c.fabric.fifo_depth = 10)]
#[case::completion_not_pow2(|c: &mut Config| c.fabric.completion_depth = 12)]
#[case::burst_exceeds_fifo(|c: &mut Config| {
    c.fabric.burst_size = 32;
    c.fabric.fifo_depth = 16;
})]
#[case::zero_words(|c: &mut Config| c.resource.words = 0)]
#[case::zero_in_flight(|c: &mut Config| c.resource.max_in_flight = 0)]
#[case::regions_exceed_store(|c: &mut Config| c.fabric.clients = 32)]
fn invalid_geometry_rejected(#[case] mutate: fn(&mut Config)) {
    let mut config = Config::default();
    mutate(&mut config);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, FabricError::InvalidConfig { .. }), "{err}");
}
