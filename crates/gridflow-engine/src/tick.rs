//! Fixed-timestep tick loop driving the traffic simulation.
//!
//! The [`TickLoop`] owns a [`Simulator`] and advances it one step per tick.
//! Each tick:
//!
//! 1. Runs [`Simulator::update`] and times it.
//! 2. Records the resulting [`StepReport`] in the tick diagnostics.
//!
//! `fixed_dt` is the wall-clock interval a tick represents. Windowed and
//! terminal runners pace themselves with it; headless runs ignore it and
//! tick as fast as possible. Because the simulator draws all randomness from
//! its own seeded generator, the tick loop is fully deterministic: same
//! config + same tick count = same state.
//!
//! # Example
//!
//! ```
//! use gridflow_engine::tick::{TickConfig, TickLoop};
//! use gridflow_sim::prelude::*;
//!
//! let sim = Simulator::new(SimConfig::default()).unwrap();
//! let mut tick_loop = TickLoop::new(sim, TickConfig::default());
//!
//! for _ in 0..10 {
//!     tick_loop.tick();
//! }
//!
//! assert_eq!(tick_loop.tick_count(), 10);
//! ```

use std::time::{Duration, Instant};

use gridflow_sim::simulator::{Simulator, StepReport};

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Seconds of wall time per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Headless mode: no rendering, no pacing, tick as fast as possible.
    pub headless: bool,
}

impl Default for TickConfig {
    /// Five ticks per second, headless off.
    fn default() -> Self {
        Self {
            fixed_dt: 0.2,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing and movement diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time spent in [`Simulator::update`].
    pub update_time: Duration,
    /// What the cars did during the tick.
    pub report: StepReport,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The deterministic fixed-timestep tick loop.
pub struct TickLoop {
    sim: Simulator,
    fixed_dt: f64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Create a tick loop around an already-built simulator.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(sim: Simulator, config: TickConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            sim,
            fixed_dt: config.fixed_dt,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Execute one simulation tick and return its step report.
    pub fn tick(&mut self) -> StepReport {
        let start = Instant::now();
        let report = self.sim.update();
        self.last_diagnostics = TickDiagnostics {
            update_time: start.elapsed(),
            report,
        };
        report
    }

    /// Run `count` ticks in sequence. Returns the total number of car moves.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        let mut moves = 0u64;
        for _ in 0..count {
            moves += self.tick().moved as u64;
        }
        moves
    }

    // -- accessors ----------------------------------------------------------

    /// Number of ticks executed (the simulator's step counter).
    pub fn tick_count(&self) -> u64 {
        self.sim.time_step()
    }

    /// Simulation time in seconds, computed as `tick_count * fixed_dt` to
    /// avoid drift from repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_count() as f64 * self.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// [`fixed_dt`](Self::fixed_dt) as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fixed_dt)
    }

    pub(crate) fn set_fixed_dt(&mut self, fixed_dt: f64) {
        assert!(
            fixed_dt > 0.0 && fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {fixed_dt}"
        );
        self.fixed_dt = fixed_dt;
        self.config.fixed_dt = fixed_dt;
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Mutable access to the simulator, e.g. to assign routes between ticks.
    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    pub(crate) fn replace_simulator(&mut self, sim: Simulator) {
        self.sim = sim;
        self.last_diagnostics = TickDiagnostics::default();
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
