//! Cars: position, heading and an optional route.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, GridPos};

/// A vehicle on the grid.
///
/// A car always faces one of the four cardinal directions and moves at most
/// one cell per step. When it has a route, [`next_move`](Self::next_move)
/// turns it toward the next waypoint before the simulator tries to move it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Unique id, assigned sequentially from 0.
    pub id: usize,
    pub position: GridPos,
    pub direction: Direction,
    /// Target cell, if the car is routed.
    pub destination: Option<GridPos>,
    /// Remaining waypoints toward `destination`, excluding the current cell.
    pub path: VecDeque<GridPos>,
}

impl Car {
    /// A car with no destination.
    pub fn new(id: usize, position: GridPos, direction: Direction) -> Self {
        Self {
            id,
            position,
            direction,
            destination: None,
            path: VecDeque::new(),
        }
    }

    /// The cell this car would enter on its next move.
    pub fn next_position(&self) -> GridPos {
        self.position.step(self.direction)
    }

    /// Move one cell forward in the current direction.
    pub fn move_forward(&mut self) {
        self.position = self.next_position();
    }

    /// Point the car along its path.
    ///
    /// Waypoints already reached are dropped. If the next waypoint is an
    /// orthogonal neighbor the car turns to face it; otherwise the heading is
    /// left unchanged.
    pub fn next_move(&mut self) {
        while self.path.front() == Some(&self.position) {
            self.path.pop_front();
        }
        if let Some(dir) = self
            .path
            .front()
            .and_then(|&waypoint| self.position.direction_to(waypoint))
        {
            self.direction = dir;
        }
    }

    /// Replace the route. `path` may or may not start at the current cell.
    pub fn set_route(&mut self, destination: GridPos, path: impl IntoIterator<Item = GridPos>) {
        self.destination = Some(destination);
        self.path = path.into_iter().collect();
        while self.path.front() == Some(&self.position) {
            self.path.pop_front();
        }
    }

    /// Drop the destination and any remaining waypoints.
    pub fn clear_route(&mut self) {
        self.destination = None;
        self.path.clear();
    }

    /// Whether the car is routed and standing on its destination.
    pub fn has_arrived(&self) -> bool {
        self.destination == Some(self.position)
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Car(id={}, pos={}, dir={})",
            self.id, self.position, self.direction
        )
    }
}
