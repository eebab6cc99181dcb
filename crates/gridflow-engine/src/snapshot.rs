//! Engine-level snapshot and restore with BLAKE3 hashing.
//!
//! Provides [`EngineSnapshot`] -- a serializable copy of the full simulation
//! state (simulator including its RNG, tick counter, fixed dt) with a BLAKE3
//! content hash for integrity verification and determinism testing.
//!
//! # Usage
//!
//! ```
//! use gridflow_engine::prelude::*;
//!
//! let sim = Simulator::new(SimConfig::default()).unwrap();
//! let mut tick_loop = TickLoop::new(sim, TickConfig::default());
//! tick_loop.run_ticks(10);
//!
//! let snapshot = tick_loop.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 10);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! tick_loop.run_ticks(10);
//! tick_loop.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(tick_loop.tick_count(), 10);
//! ```
//!
//! # Branching
//!
//! [`TickLoop::fork_snapshot`] captures a branch point. Because the RNG state
//! travels with the snapshot, replaying from a fork reproduces the first
//! branch exactly:
//!
//! ```
//! use gridflow_engine::prelude::*;
//!
//! let sim = Simulator::new(SimConfig { routing: true, ..Default::default() }).unwrap();
//! let mut tick_loop = TickLoop::new(sim, TickConfig::default());
//! tick_loop.run_ticks(25);
//!
//! let fork = tick_loop.fork_snapshot();
//! tick_loop.run_ticks(25);
//! let hash_a = tick_loop.state_hash();
//!
//! tick_loop.restore_from_snapshot(&fork).unwrap();
//! tick_loop.run_ticks(25);
//! assert_eq!(hash_a, tick_loop.state_hash());
//! ```
//!
//! Diagnostics are transient and not snapshotted.

use gridflow_sim::simulator::Simulator;
use serde::{Deserialize, Serialize};

use crate::tick::TickLoop;

// ---------------------------------------------------------------------------
// EngineSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of the full engine simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Complete simulator state, including the RNG.
    pub sim: Simulator,
    /// Ticks executed at the time of capture.
    pub tick_counter: u64,
    /// Seconds per tick.
    pub fixed_dt: f64,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the serialized state.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the canonical JSON of everything that affects
/// determinism. The hash field itself is not included.
fn compute_hash(
    sim: &Simulator,
    tick_counter: u64,
    fixed_dt: f64,
) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        sim: &'a Simulator,
        tick_counter: u64,
        fixed_dt: f64,
    }

    let json_bytes = serde_json::to_vec(&HashableState {
        sim,
        tick_counter,
        fixed_dt,
    })?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// TickLoop snapshot/restore methods
// ---------------------------------------------------------------------------

impl TickLoop {
    /// Capture a complete snapshot of the simulation state.
    pub fn capture_snapshot(&self) -> EngineSnapshot {
        let sim = self.simulator().clone();
        let tick_counter = self.tick_count();
        let fixed_dt = self.fixed_dt();
        let hash = self.state_hash();
        EngineSnapshot {
            sim,
            tick_counter,
            fixed_dt,
            hash,
        }
    }

    /// Restore the simulation state from a previously captured snapshot.
    ///
    /// The snapshot's `fixed_dt`, tick counter and hash are all validated
    /// before anything is mutated; on error the tick loop is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `fixed_dt` is not positive and finite, if the tick
    /// counter disagrees with the simulator's step count, or if the hash does
    /// not match the snapshot contents (corruption or tampering).
    pub fn restore_from_snapshot(
        &mut self,
        snapshot: &EngineSnapshot,
    ) -> Result<(), anyhow::Error> {
        if !(snapshot.fixed_dt > 0.0 && snapshot.fixed_dt.is_finite()) {
            return Err(anyhow::anyhow!(
                "snapshot has invalid fixed_dt: {}. Must be positive and finite.",
                snapshot.fixed_dt
            ));
        }

        if snapshot.tick_counter != snapshot.sim.time_step() {
            return Err(anyhow::anyhow!(
                "snapshot tick counter {} does not match simulator step {}",
                snapshot.tick_counter,
                snapshot.sim.time_step()
            ));
        }

        let expected_hash = compute_hash(&snapshot.sim, snapshot.tick_counter, snapshot.fixed_dt)?;
        if expected_hash != snapshot.hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected_hash
            ));
        }

        self.replace_simulator(snapshot.sim.clone());
        self.set_fixed_dt(snapshot.fixed_dt);

        tracing::info!(
            tick = snapshot.tick_counter,
            hash = %snapshot.hash,
            "restored engine snapshot"
        );
        Ok(())
    }

    /// The BLAKE3 state hash, equivalent to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        compute_hash(self.simulator(), self.tick_count(), self.fixed_dt())
            .expect("simulator state is always JSON-serializable")
    }

    /// Capture a branch point. Identical to
    /// [`capture_snapshot`](Self::capture_snapshot).
    pub fn fork_snapshot(&self) -> EngineSnapshot {
        self.capture_snapshot()
    }
}

impl EngineSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON. The hash is verified on restore, not here.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
