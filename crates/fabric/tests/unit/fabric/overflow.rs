//! Overflow latch and fatal fault tests.
//!
//! Request overflow is local and sticky; completion overflow and protocol
//! violations poison the whole fabric and every later round reports the
//! same fault.

use memfab_core::common::{ClientId, FabricError};
use memfab_core::fabric::Fabric;

use crate::common::harness::geometry;
use crate::common::mocks::resource::ScriptedResource;

/// The worked stall scenario from the design notes: the resource never
/// asserts `ready`, the client keeps enqueuing, and the overflow latch sets
/// exactly when an enqueue is attempted past capacity. With one burst
/// staged, the lane absorbs `fifo_depth + burst_size` words before that.
#[test]
fn stalled_resource_latches_overflow_at_capacity() {
    let config = geometry(2, 8, 16);
    let mut fabric =
        Fabric::new(&config, ScriptedResource::with_ready_pattern(vec![false])).unwrap();
    let c0 = ClientId(0);

    let mut accepted = 0u64;
    let mut rejected_at = None;
    for word in 0..40u64 {
        match fabric.enqueue_write(c0, word) {
            Ok(_) => accepted += 1,
            Err(err) => {
                rejected_at = Some((word, err));
                break;
            }
        }
        fabric.tick().unwrap();
    }

    let (word, err) = rejected_at.expect("overflow must occur");
    assert_eq!(accepted, 24, "queue depth plus one staged burst");
    assert_eq!(word, 24);
    assert_eq!(err, FabricError::RequestOverflow { client: c0 });
    assert!(fabric.status(c0).overflow);
    assert_eq!(fabric.stats().request_overflows, 1);

    // The fault is local: the other client still flows.
    let _ = fabric.enqueue_write(ClientId(1), 7).unwrap();
    assert!(!fabric.status(ClientId(1)).overflow);
    assert!(fabric.resource().submitted.is_empty());
}

/// Once latched, overflow stays set through further traffic and clears only
/// on an explicit reset.
#[test]
fn overflow_latch_is_monotonic_until_cleared() {
    let config = geometry(1, 4, 4);
    let mut fabric = Fabric::new(&config, ScriptedResource::always_ready()).unwrap();
    let c0 = ClientId(0);

    // Burst size equals a full queue; stage one burst, fill the queue, and
    // push one word too many.
    let mut pushed = 0u64;
    while fabric.enqueue_write(c0, pushed).is_ok() {
        pushed += 1;
        if pushed > 64 {
            // Drain nothing: the resource is ready but we never tick, so
            // capacity is the queue alone.
            break;
        }
    }
    assert!(fabric.status(c0).overflow);

    // Traffic drains, the latch stays.
    fabric.run(20).unwrap();
    assert_eq!(fabric.status(c0).fifo_occupancy, 0);
    assert!(fabric.status(c0).overflow);

    fabric.clear_latches(c0);
    assert!(!fabric.status(c0).overflow);

    // The latch can set again after a clear.
    let mut again = 0u64;
    while fabric.enqueue_write(c0, again).is_ok() {
        again += 1;
    }
    assert!(fabric.status(c0).overflow);
}

/// A client that issues reads faster than it acknowledges completions hits
/// a fatal completion overflow; the fabric poisons and repeats the fault.
#[test]
fn completion_overflow_is_fatal_and_poisons() {
    let mut config = geometry(1, 4, 16);
    config.fabric.completion_depth = 2;
    config.validate().unwrap();
    let mut fabric =
        Fabric::new(&config, ScriptedResource::always_ready().echo_reads()).unwrap();
    let c0 = ClientId(0);

    for addr in 0..4u64 {
        let _ = fabric.enqueue_read(c0, addr).unwrap();
    }
    // One burst of four reads echoes four completions into a two-deep
    // completion queue within a single round.
    let err = loop {
        match fabric.tick() {
            Ok(()) => {}
            Err(err) => break err,
        }
    };
    assert_eq!(err, FabricError::CompletionOverflow { client: c0 });
    assert_eq!(fabric.fault(), Some(&err));

    // Poisoned: every further round reports the same fault.
    assert_eq!(fabric.tick(), Err(err.clone()));
    assert_eq!(fabric.run(5), Err(err));
}

/// A completion no grant accounts for trips the debug assertion: the
/// resource broke its FIFO contract and the router refuses to guess.
#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "completion with no outstanding grant")]
fn spurious_completion_asserts_in_debug() {
    let config = geometry(1, 4, 16);
    let mut fabric = Fabric::new(&config, ScriptedResource::always_ready()).unwrap();

    fabric.resource_mut().inject_completion(99);
    let _ = fabric.tick();
}

/// In release builds the same violation surfaces as a hard error instead.
#[cfg(not(debug_assertions))]
#[test]
fn spurious_completion_is_hard_error_in_release() {
    let config = geometry(1, 4, 16);
    let mut fabric = Fabric::new(&config, ScriptedResource::always_ready()).unwrap();

    fabric.resource_mut().inject_completion(99);
    let err = fabric.tick().unwrap_err();
    assert!(matches!(err, FabricError::ProtocolOrderViolation { .. }));
    assert!(matches!(
        fabric.tick(),
        Err(FabricError::ProtocolOrderViolation { .. })
    ));
}
