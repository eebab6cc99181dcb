//! Signalised intersections.
//!
//! An intersection holds a two-way light: one of the north-south or
//! east-west axes is green while the other is red. The light flips every
//! `cycle_length` steps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Axis, Direction, GridPos};
use crate::SimError;

/// Color shown to one axis of an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Green,
    Red,
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LightColor::Green => "green",
            LightColor::Red => "red",
        })
    }
}

/// Which axis currently has the green light.
///
/// Storing the phase rather than two independent colors makes "both green"
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// North-south green, east-west red.
    #[default]
    NorthSouthGreen,
    /// East-west green, north-south red.
    EastWestGreen,
}

impl Phase {
    pub const fn green_axis(self) -> Axis {
        match self {
            Phase::NorthSouthGreen => Axis::NorthSouth,
            Phase::EastWestGreen => Axis::EastWest,
        }
    }

    pub const fn swapped(self) -> Self {
        match self {
            Phase::NorthSouthGreen => Phase::EastWestGreen,
            Phase::EastWestGreen => Phase::NorthSouthGreen,
        }
    }
}

/// A traffic light at a grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub position: GridPos,
    phase: Phase,
    cycle_length: u32,
    timer: u32,
}

impl Intersection {
    /// Create an intersection.
    ///
    /// `initial_phase` defaults to north-south green.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `cycle_length` is zero.
    pub fn new(
        position: GridPos,
        initial_phase: Option<Phase>,
        cycle_length: u32,
    ) -> Result<Self, SimError> {
        if cycle_length == 0 {
            return Err(SimError::InvalidConfig {
                field: "intersection_cycle",
                reason: "cycle length must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            position,
            phase: initial_phase.unwrap_or_default(),
            cycle_length,
            timer: 0,
        })
    }

    /// Advance the light timer by one step, swapping the phase when the
    /// timer reaches the cycle length.
    pub fn update_light(&mut self) {
        self.timer += 1;
        if self.timer >= self.cycle_length {
            self.phase = self.phase.swapped();
            self.timer = 0;
        }
    }

    /// Whether traffic heading in `direction` has a green light.
    pub fn is_green(&self, direction: Direction) -> bool {
        direction.axis() == self.phase.green_axis()
    }

    /// Colors shown to the `(north-south, east-west)` axes.
    pub fn light_state(&self) -> (LightColor, LightColor) {
        match self.phase {
            Phase::NorthSouthGreen => (LightColor::Green, LightColor::Red),
            Phase::EastWestGreen => (LightColor::Red, LightColor::Green),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Steps elapsed since the last phase change.
    pub fn timer(&self) -> u32 {
        self.timer
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ns, ew) = self.light_state();
        write!(f, "Intersection(pos={}, NS={ns}, EW={ew})", self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_origin(cycle: u32) -> Intersection {
        Intersection::new(GridPos::new(0, 0), None, cycle).unwrap()
    }

    #[test]
    fn defaults_to_north_south_green() {
        let light = at_origin(5);
        assert_eq!(light.light_state(), (LightColor::Green, LightColor::Red));
        assert!(light.is_green(Direction::N));
        assert!(light.is_green(Direction::S));
        assert!(!light.is_green(Direction::E));
        assert!(!light.is_green(Direction::W));
    }

    #[test]
    fn swaps_after_cycle_length_steps() {
        let mut light = at_origin(3);
        light.update_light();
        light.update_light();
        assert_eq!(light.phase(), Phase::NorthSouthGreen);
        assert_eq!(light.timer(), 2);

        light.update_light();
        assert_eq!(light.phase(), Phase::EastWestGreen);
        assert_eq!(light.timer(), 0);
        assert!(light.is_green(Direction::E));

        for _ in 0..3 {
            light.update_light();
        }
        assert_eq!(light.phase(), Phase::NorthSouthGreen);
    }

    #[test]
    fn cycle_of_one_flips_every_step() {
        let mut light = at_origin(1);
        light.update_light();
        assert_eq!(light.phase(), Phase::EastWestGreen);
        light.update_light();
        assert_eq!(light.phase(), Phase::NorthSouthGreen);
    }

    #[test]
    fn zero_cycle_is_rejected() {
        let err = Intersection::new(GridPos::new(0, 0), None, 0).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "intersection_cycle", .. }));
    }

    #[test]
    fn explicit_initial_phase() {
        let light =
            Intersection::new(GridPos::new(3, 3), Some(Phase::EastWestGreen), 5).unwrap();
        assert_eq!(light.light_state(), (LightColor::Red, LightColor::Green));
        assert_eq!(light.to_string(), "Intersection(pos=(3, 3), NS=red, EW=green)");
    }
}
