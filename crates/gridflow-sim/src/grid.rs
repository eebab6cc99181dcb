//! Grid geometry: cell coordinates and cardinal directions.
//!
//! The grid has `(0, 0)` at the top-left with `y` increasing downward, so
//! [`Direction::N`] decrements `y` and [`Direction::S`] increments it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GridPos
// ---------------------------------------------------------------------------

/// A cell on the simulation grid.
///
/// Coordinates are signed so that a step off the top or left edge produces
/// a representable (out-of-bounds) position instead of wrapping. Ordering is
/// x-major, which gives column-by-column iteration in ordered maps.
///
/// Serializes as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The direction that leads from `self` to an orthogonally adjacent
    /// `other`, or `None` if the cells are not adjacent.
    pub fn direction_to(self, other: GridPos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| self.step(d) == other)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<GridPos> for (i32, i32) {
    fn from(pos: GridPos) -> Self {
        (pos.x, pos.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Direction / Axis
// ---------------------------------------------------------------------------

/// Cardinal heading of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    S,
    E,
    W,
}

/// The two signal axes an intersection alternates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Direction {
    /// All directions, in the order neighbors are explored.
    pub const ALL: [Direction; 4] = [Direction::N, Direction::S, Direction::E, Direction::W];

    /// `(dx, dy)` for one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::S => (0, 1),
            Direction::E => (1, 0),
            Direction::W => (-1, 0),
        }
    }

    /// The signal axis that governs traffic heading this way.
    pub const fn axis(self) -> Axis {
        match self {
            Direction::N | Direction::S => Axis::NorthSouth,
            Direction::E | Direction::W => Axis::EastWest,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Direction::N => 'N',
            Direction::S => 'S',
            Direction::E => 'E',
            Direction::W => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Direction::N),
            "S" => Ok(Direction::S),
            "E" => Ok(Direction::E),
            "W" => Ok(Direction::W),
            other => Err(format!("unknown direction '{other}', expected one of N, S, E, W")),
        }
    }
}

impl Axis {
    /// The other axis.
    pub const fn flipped(self) -> Self {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_follows_screen_coordinates() {
        let origin = GridPos::new(5, 5);
        assert_eq!(origin.step(Direction::N), GridPos::new(5, 4));
        assert_eq!(origin.step(Direction::S), GridPos::new(5, 6));
        assert_eq!(origin.step(Direction::E), GridPos::new(6, 5));
        assert_eq!(origin.step(Direction::W), GridPos::new(4, 5));
    }

    #[test]
    fn step_off_the_top_edge_goes_negative() {
        assert_eq!(GridPos::new(0, 0).step(Direction::N), GridPos::new(0, -1));
    }

    #[test]
    fn direction_to_adjacent_and_distant_cells() {
        let a = GridPos::new(2, 2);
        assert_eq!(a.direction_to(GridPos::new(2, 1)), Some(Direction::N));
        assert_eq!(a.direction_to(GridPos::new(1, 2)), Some(Direction::W));
        assert_eq!(a.direction_to(GridPos::new(3, 3)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn axis_grouping() {
        assert_eq!(Direction::N.axis(), Axis::NorthSouth);
        assert_eq!(Direction::S.axis(), Axis::NorthSouth);
        assert_eq!(Direction::E.axis(), Axis::EastWest);
        assert_eq!(Direction::W.axis(), Axis::EastWest);
        assert_eq!(Axis::NorthSouth.flipped(), Axis::EastWest);
    }

    #[test]
    fn grid_pos_serializes_as_pair() {
        let json = serde_json::to_string(&GridPos::new(3, -1)).unwrap();
        assert_eq!(json, "[3,-1]");
        let back: GridPos = serde_json::from_str("[4,7]").unwrap();
        assert_eq!(back, GridPos::new(4, 7));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("e".parse::<Direction>(), Ok(Direction::E));
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(serde_json::to_string(&Direction::W).unwrap(), "\"W\"");
    }

    #[test]
    fn ordering_is_x_major() {
        let mut cells = vec![GridPos::new(3, 0), GridPos::new(0, 3), GridPos::new(0, 0)];
        cells.sort();
        assert_eq!(
            cells,
            vec![GridPos::new(0, 0), GridPos::new(0, 3), GridPos::new(3, 0)]
        );
    }
}
