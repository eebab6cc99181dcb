//! Tests for engine snapshot capture, restore, and determinism hashing.

use gridflow_engine::prelude::*;
use proptest::prelude::*;

fn routed_loop(seed: u64) -> TickLoop {
    let sim = Simulator::new(SimConfig {
        grid_size: 12,
        num_cars: 10,
        routing: true,
        layout: RoadLayout::Grid { spacing: 3 },
        seed,
        ..Default::default()
    })
    .unwrap();
    TickLoop::new(
        sim,
        TickConfig {
            headless: true,
            ..Default::default()
        },
    )
}

// ---------------------------------------------------------------------------
// 1. Hash properties
// ---------------------------------------------------------------------------

#[test]
fn hash_is_64_hex_chars() {
    let tick_loop = routed_loop(1);
    let hash = tick_loop.state_hash();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn same_seed_same_hash_after_many_ticks() {
    let mut a = routed_loop(9);
    let mut b = routed_loop(9);
    a.run_ticks(200);
    b.run_ticks(200);
    assert_eq!(a.state_hash(), b.state_hash());
}

#[test]
fn different_seed_different_hash() {
    let a = routed_loop(1);
    let b = routed_loop(2);
    assert_ne!(a.state_hash(), b.state_hash());
}

#[test]
fn hash_changes_when_ticking() {
    let mut tick_loop = routed_loop(3);
    let before = tick_loop.state_hash();
    tick_loop.tick();
    assert_ne!(before, tick_loop.state_hash());
}

// ---------------------------------------------------------------------------
// 2. Capture / restore
// ---------------------------------------------------------------------------

#[test]
fn restore_rewinds_state() {
    let mut tick_loop = routed_loop(4);
    tick_loop.run_ticks(30);
    let snapshot = tick_loop.capture_snapshot();
    let state_at_30 = tick_loop.simulator().get_state();

    tick_loop.run_ticks(30);
    assert_eq!(tick_loop.tick_count(), 60);

    tick_loop.restore_from_snapshot(&snapshot).unwrap();
    assert_eq!(tick_loop.tick_count(), 30);
    assert_eq!(tick_loop.simulator().get_state(), state_at_30);
    assert_eq!(tick_loop.state_hash(), snapshot.hash);
}

#[test]
fn fork_replays_identically_including_rng() {
    let mut tick_loop = routed_loop(5);
    tick_loop.run_ticks(40);
    let fork = tick_loop.fork_snapshot();

    tick_loop.run_ticks(80);
    let branch_a = tick_loop.simulator().get_state();
    let arrivals_a = tick_loop.simulator().total_arrivals();

    tick_loop.restore_from_snapshot(&fork).unwrap();
    tick_loop.run_ticks(80);
    assert_eq!(tick_loop.simulator().get_state(), branch_a);
    assert_eq!(tick_loop.simulator().total_arrivals(), arrivals_a);
}

#[test]
fn restore_onto_a_different_loop() {
    let mut source = routed_loop(6);
    source.run_ticks(25);
    let snapshot = source.capture_snapshot();

    let mut target = routed_loop(99);
    target.restore_from_snapshot(&snapshot).unwrap();
    assert_eq!(target.state_hash(), source.state_hash());
}

#[test]
fn json_round_trip_restores() {
    let mut tick_loop = routed_loop(7);
    tick_loop.run_ticks(12);
    let json = tick_loop.capture_snapshot().to_json().unwrap();

    let parsed = EngineSnapshot::from_json(&json).unwrap();
    let mut fresh = routed_loop(0);
    fresh.restore_from_snapshot(&parsed).unwrap();
    assert_eq!(fresh.tick_count(), 12);
    assert_eq!(fresh.state_hash(), tick_loop.state_hash());
}

#[test]
fn json_round_trip_keeps_awkward_fixed_dt() {
    for fixed_dt in [0.10494135463009499, 0.1 + 0.2, 1.0 / 3.0, 1.7 / 7.0] {
        let mut tick_loop = TickLoop::new(
            Simulator::new(SimConfig::default()).unwrap(),
            TickConfig {
                fixed_dt,
                headless: true,
            },
        );
        tick_loop.run_ticks(3);
        let json = tick_loop.capture_snapshot().to_json().unwrap();

        let parsed = EngineSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed.fixed_dt.to_bits(), fixed_dt.to_bits());
        let mut fresh = routed_loop(0);
        fresh.restore_from_snapshot(&parsed).unwrap();
        assert_eq!(fresh.fixed_dt(), fixed_dt);
    }
}

#[test]
fn snapshot_survives_json_value_round_trip() {
    // The RNG state is a u128; it must survive an untyped JSON value.
    let mut tick_loop = routed_loop(12);
    tick_loop.run_ticks(9);
    let snapshot = tick_loop.capture_snapshot();

    let value = serde_json::to_value(&snapshot).unwrap();
    let back: EngineSnapshot = serde_json::from_value(value).unwrap();
    let mut fresh = routed_loop(0);
    fresh.restore_from_snapshot(&back).unwrap();

    tick_loop.run_ticks(20);
    fresh.run_ticks(20);
    assert_eq!(fresh.state_hash(), tick_loop.state_hash());
}

// ---------------------------------------------------------------------------
// 3. Rejected snapshots leave the loop untouched
// ---------------------------------------------------------------------------

#[test]
fn tampered_hash_is_rejected() {
    let mut tick_loop = routed_loop(8);
    let mut snapshot = tick_loop.capture_snapshot();
    snapshot.hash = "0".repeat(64);

    tick_loop.run_ticks(5);
    let before = tick_loop.state_hash();
    let err = tick_loop.restore_from_snapshot(&snapshot).unwrap_err();
    assert!(err.to_string().contains("hash mismatch"), "{err}");
    assert_eq!(tick_loop.state_hash(), before);
}

#[test]
fn tampered_state_is_rejected() {
    let mut tick_loop = routed_loop(8);
    tick_loop.run_ticks(3);
    let snapshot = tick_loop.capture_snapshot();

    let mut json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
    let x = json["sim"]["cars"][0]["position"][0].as_i64().unwrap();
    json["sim"]["cars"][0]["position"][0] = serde_json::json!(x + 1);
    let forged: EngineSnapshot = serde_json::from_value(json).unwrap();

    assert!(tick_loop.restore_from_snapshot(&forged).is_err());
}

#[test]
fn invalid_fixed_dt_is_rejected() {
    let mut tick_loop = routed_loop(10);
    let mut snapshot = tick_loop.capture_snapshot();
    snapshot.fixed_dt = -1.0;
    let err = tick_loop.restore_from_snapshot(&snapshot).unwrap_err();
    assert!(err.to_string().contains("invalid fixed_dt"), "{err}");
}

#[test]
fn mismatched_tick_counter_is_rejected() {
    let mut tick_loop = routed_loop(11);
    tick_loop.run_ticks(2);
    let mut snapshot = tick_loop.capture_snapshot();
    snapshot.tick_counter = 99;
    assert!(tick_loop.restore_from_snapshot(&snapshot).is_err());
    assert_eq!(tick_loop.tick_count(), 2);
}

// ---------------------------------------------------------------------------
// 4. Property: restore-and-replay is indistinguishable from running through
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn replay_from_any_tick_matches(seed in 0u64..1_000, split in 0u64..40, tail in 1u64..40) {
        let mut straight = routed_loop(seed);
        straight.run_ticks(split + tail);

        let mut replay = routed_loop(seed);
        replay.run_ticks(split);
        let snapshot = replay.capture_snapshot();
        replay.run_ticks(7);
        replay.restore_from_snapshot(&snapshot).unwrap();
        replay.run_ticks(tail);

        prop_assert_eq!(replay.state_hash(), straight.state_hash());
    }
}
