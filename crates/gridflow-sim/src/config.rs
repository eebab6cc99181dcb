//! Simulation configuration.
//!
//! [`SimConfig`] deserializes from JSON with every field optional:
//!
//! ```
//! use gridflow_sim::config::{RoadLayout, SimConfig};
//!
//! let json = r#"{ "grid_size": 12, "layout": { "grid": { "spacing": 3 } } }"#;
//! let config = SimConfig::from_json(json).unwrap();
//! assert_eq!(config.grid_size, 12);
//! assert_eq!(config.num_cars, 5);
//! assert_eq!(config.layout, RoadLayout::Grid { spacing: 3 });
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;
use crate::SimError;

/// Default grid edge length in cells.
pub const GRID_SIZE: u32 = 10;
/// Default number of cars.
pub const NUM_CARS: usize = 5;
/// Default steps between light changes.
pub const INTERSECTION_CYCLE: u32 = 5;
/// Default spacing between intersections, in cells.
pub const INTERSECTION_SPACING: u32 = 3;
/// Default RNG seed.
pub const SEED: u64 = 42;
/// Largest accepted grid edge. Road sets and ASCII frames hold one entry per
/// cell.
pub const MAX_GRID_SIZE: u32 = 1024;

/// Which cells of the grid are drivable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadLayout {
    /// Every cell is road.
    #[default]
    Open,
    /// Rows and columns at multiples of `spacing` are road.
    Grid { spacing: u32 },
    /// The middle row and middle column.
    Plus,
    /// An explicit set of road cells.
    Custom { cells: Vec<GridPos> },
}

/// Parameters for building a [`Simulator`](crate::simulator::Simulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Edge length of the square grid.
    pub grid_size: u32,
    /// Number of cars placed at startup.
    pub num_cars: usize,
    /// Steps before each intersection's light flips.
    pub intersection_cycle: u32,
    /// Intersections sit on road cells whose x and y are multiples of this.
    pub intersection_spacing: u32,
    pub layout: RoadLayout,
    /// Seed for car placement, headings and route destinations.
    pub seed: u64,
    /// Give every car a random destination and steer it along a BFS path.
    pub routing: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            num_cars: NUM_CARS,
            intersection_cycle: INTERSECTION_CYCLE,
            intersection_spacing: INTERSECTION_SPACING,
            layout: RoadLayout::Open,
            seed: SEED,
            routing: false,
        }
    }
}

impl SimConfig {
    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded simulation config");
        Ok(config)
    }

    /// Check that every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.grid_size == 0 {
            return Err(invalid("grid_size", "grid must be at least 1x1"));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(SimError::InvalidConfig {
                field: "grid_size",
                reason: format!("grid may be at most {MAX_GRID_SIZE}x{MAX_GRID_SIZE}"),
            });
        }
        if self.intersection_cycle == 0 {
            return Err(invalid("intersection_cycle", "cycle length must be at least 1"));
        }
        if self.intersection_spacing == 0 {
            return Err(invalid("intersection_spacing", "spacing must be at least 1"));
        }
        match &self.layout {
            RoadLayout::Grid { spacing: 0 } => {
                return Err(invalid("layout", "grid layout spacing must be at least 1"));
            }
            RoadLayout::Custom { cells } => {
                let size = self.grid_size as i32;
                if let Some(bad) = cells
                    .iter()
                    .find(|c| c.x < 0 || c.y < 0 || c.x >= size || c.y >= size)
                {
                    return Err(SimError::InvalidConfig {
                        field: "layout",
                        reason: format!("road cell {bad} is off the {size}x{size} grid"),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> SimError {
    SimError::InvalidConfig {
        field,
        reason: reason.to_owned(),
    }
}
