//! Gridflow Engine -- drives the grid traffic simulation.
//!
//! This crate builds on [`gridflow_sim`] to provide a fixed-timestep tick
//! loop, hashed snapshots for determinism checks, a terminal runner that
//! prints ASCII frames or JSON state, and (behind the `renderer` feature) a
//! wgpu window that draws the grid and its cars.
//!
//! # Quick Start
//!
//! ```
//! use gridflow_engine::prelude::*;
//!
//! let sim = Simulator::new(SimConfig { grid_size: 9, ..Default::default() }).unwrap();
//! let config = TickConfig { headless: true, ..Default::default() };
//! let mut tick_loop = TickLoop::new(sim, config);
//!
//! tick_loop.run_ticks(100);
//! assert_eq!(tick_loop.tick_count(), 100);
//! ```

#![deny(unsafe_code)]

pub mod render;
pub mod runner;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the simulation crate for convenience.
pub use gridflow_sim;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use gridflow_sim::prelude::*;

    pub use crate::runner::{run, Output};
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::tick::{TickConfig, TickDiagnostics, TickLoop};
}
