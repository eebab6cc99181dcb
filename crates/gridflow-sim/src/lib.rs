//! Gridflow Sim -- deterministic grid traffic simulation.
//!
//! Cars drive one cell per step across a square grid. Signalised
//! intersections alternate green between the north-south and east-west axes,
//! cars stop at red lights and never share a cell, and an optional router
//! steers cars along breadth-first paths through the road network.
//!
//! All randomness flows from a seeded PCG generator owned by the
//! [`Simulator`](simulator::Simulator), so the same [`SimConfig`](config::SimConfig)
//! always produces the same run.
//!
//! # Quick Start
//!
//! ```
//! use gridflow_sim::prelude::*;
//!
//! let config = SimConfig { grid_size: 9, num_cars: 4, ..Default::default() };
//! let mut sim = Simulator::new(config).unwrap();
//!
//! for _ in 0..20 {
//!     sim.update();
//! }
//!
//! let state = sim.get_state();
//! assert_eq!(state.time_step, 20);
//! assert_eq!(state.cars.len(), 4);
//! ```

#![deny(unsafe_code)]

pub mod car;
pub mod config;
pub mod grid;
pub mod intersection;
pub mod road;
pub mod simulator;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while configuring or driving a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A configuration value is out of its allowed range.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The grid does not have enough free road cells for the requested cars.
    #[error("cannot place {requested} cars: only {available} free road cells")]
    NotEnoughSpace { requested: usize, available: usize },

    /// A car id was referenced that does not exist.
    #[error("car {id} does not exist (simulation has {count} cars)")]
    UnknownCar { id: usize, count: usize },

    /// No road path connects the two cells.
    #[error("no road path from {from} to {to}")]
    Unreachable { from: grid::GridPos, to: grid::GridPos },

    /// Reading a config file failed.
    #[error("failed to read config file '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A config file was not valid JSON for [`SimConfig`](config::SimConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::car::Car;
    pub use crate::config::{RoadLayout, SimConfig};
    pub use crate::grid::{Axis, Direction, GridPos};
    pub use crate::intersection::{Intersection, LightColor, Phase};
    pub use crate::road::RoadNetwork;
    pub use crate::simulator::{CarState, IntersectionState, SimState, Simulator, StepReport};
    pub use crate::SimError;
}
