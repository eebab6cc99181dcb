//! Road network: the set of drivable cells and shortest-path routing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::RoadLayout;
use crate::grid::{Direction, GridPos};

/// The drivable cells of a `grid_size` x `grid_size` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadNetwork {
    grid_size: u32,
    road_cells: BTreeSet<GridPos>,
}

impl RoadNetwork {
    /// Build the road cells described by `layout`.
    ///
    /// Custom cells outside the grid are dropped; [`SimConfig::validate`]
    /// rejects them up front.
    ///
    /// [`SimConfig::validate`]: crate::config::SimConfig::validate
    pub fn from_layout(grid_size: u32, layout: &RoadLayout) -> Self {
        let size = grid_size as i32;
        let all = || (0..size).flat_map(move |x| (0..size).map(move |y| GridPos::new(x, y)));

        let road_cells: BTreeSet<GridPos> = match layout {
            RoadLayout::Open => all().collect(),
            RoadLayout::Grid { spacing } => {
                let spacing = (*spacing).max(1) as i32;
                all()
                    .filter(|p| p.x % spacing == 0 || p.y % spacing == 0)
                    .collect()
            }
            RoadLayout::Plus => {
                let mid = size / 2;
                all().filter(|p| p.x == mid || p.y == mid).collect()
            }
            RoadLayout::Custom { cells } => cells
                .iter()
                .copied()
                .filter(|p| p.x >= 0 && p.y >= 0 && p.x < size && p.y < size)
                .collect(),
        };

        Self {
            grid_size,
            road_cells,
        }
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Whether `pos` is a road cell.
    pub fn is_road(&self, pos: GridPos) -> bool {
        self.road_cells.contains(&pos)
    }

    /// Road cells in x-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.road_cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.road_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.road_cells.is_empty()
    }

    /// Adjacent road cells in N, S, E, W order.
    pub fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        Direction::ALL
            .into_iter()
            .map(|d| pos.step(d))
            .filter(|p| self.is_road(*p))
            .collect()
    }

    /// Shortest path over road cells from `start` to `goal`, inclusive of
    /// both ends.
    ///
    /// Returns `None` if either end is off-road or the goal cannot be
    /// reached. `start == goal` yields `[start]`.
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
        if !self.is_road(start) || !self.is_road(goal) {
            return None;
        }
        pathfinding::prelude::bfs(&start, |p| self.neighbors(*p), |p| *p == goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_layout_covers_every_cell() {
        let roads = RoadNetwork::from_layout(4, &RoadLayout::Open);
        assert_eq!(roads.len(), 16);
        assert!(roads.is_road(GridPos::new(3, 3)));
        assert!(!roads.is_road(GridPos::new(4, 0)));
        assert!(!roads.is_road(GridPos::new(-1, 0)));
    }

    #[test]
    fn grid_layout_keeps_multiples_of_spacing() {
        let roads = RoadNetwork::from_layout(7, &RoadLayout::Grid { spacing: 3 });
        assert!(roads.is_road(GridPos::new(0, 5)));
        assert!(roads.is_road(GridPos::new(3, 1)));
        assert!(roads.is_road(GridPos::new(4, 6)));
        assert!(!roads.is_road(GridPos::new(1, 1)));
        assert!(!roads.is_road(GridPos::new(4, 5)));
    }

    #[test]
    fn plus_layout_is_middle_row_and_column() {
        let roads = RoadNetwork::from_layout(5, &RoadLayout::Plus);
        assert_eq!(roads.len(), 9);
        assert!(roads.is_road(GridPos::new(2, 0)));
        assert!(roads.is_road(GridPos::new(0, 2)));
        assert!(!roads.is_road(GridPos::new(1, 1)));
    }

    #[test]
    fn neighbors_are_roads_in_fixed_order() {
        let roads = RoadNetwork::from_layout(3, &RoadLayout::Open);
        assert_eq!(
            roads.neighbors(GridPos::new(1, 1)),
            vec![
                GridPos::new(1, 0),
                GridPos::new(1, 2),
                GridPos::new(2, 1),
                GridPos::new(0, 1),
            ]
        );
        assert_eq!(
            roads.neighbors(GridPos::new(0, 0)),
            vec![GridPos::new(0, 1), GridPos::new(1, 0)]
        );
    }

    #[test]
    fn find_path_is_shortest() {
        let roads = RoadNetwork::from_layout(5, &RoadLayout::Open);
        let path = roads
            .find_path(GridPos::new(0, 0), GridPos::new(3, 2))
            .unwrap();
        assert_eq!(path.first(), Some(&GridPos::new(0, 0)));
        assert_eq!(path.last(), Some(&GridPos::new(3, 2)));
        assert_eq!(path.len(), 6);
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
        }
    }

    #[test]
    fn find_path_follows_roads_only() {
        let roads = RoadNetwork::from_layout(7, &RoadLayout::Grid { spacing: 3 });
        let path = roads
            .find_path(GridPos::new(0, 1), GridPos::new(4, 3))
            .unwrap();
        assert!(path.iter().all(|p| roads.is_road(*p)));
    }

    #[test]
    fn find_path_to_self() {
        let roads = RoadNetwork::from_layout(3, &RoadLayout::Open);
        let here = GridPos::new(1, 1);
        assert_eq!(roads.find_path(here, here), Some(vec![here]));
    }

    #[test]
    fn find_path_unreachable_or_off_road() {
        let roads = RoadNetwork::from_layout(
            5,
            &RoadLayout::Custom {
                cells: vec![GridPos::new(0, 0), GridPos::new(1, 0), GridPos::new(4, 4)],
            },
        );
        assert_eq!(roads.find_path(GridPos::new(0, 0), GridPos::new(4, 4)), None);
        assert_eq!(roads.find_path(GridPos::new(2, 2), GridPos::new(0, 0)), None);
        assert_eq!(
            roads.find_path(GridPos::new(0, 0), GridPos::new(1, 0)),
            Some(vec![GridPos::new(0, 0), GridPos::new(1, 0)])
        );
    }
}
