//! The grid traffic simulator.
//!
//! [`Simulator`] owns the road network, the intersections and the cars, and
//! advances them one discrete step at a time with [`Simulator::update`].
//!
//! # Step order
//!
//! 1. The step counter increments.
//! 2. Every intersection advances its light timer.
//! 3. Cars are processed in id order. Each car (after steering toward its
//!    route, when routing is enabled) attempts to enter the cell ahead and
//!    stays put if that cell is off the grid, off-road, behind a red light, or
//!    occupied. Occupancy is checked against positions *as updated so far
//!    this step*, so a car may follow directly behind one that just moved.
//!
//! # Example
//!
//! ```
//! use gridflow_sim::prelude::*;
//!
//! let cars = vec![Car::new(0, GridPos::new(1, 0), Direction::S)];
//! let config = SimConfig { grid_size: 4, ..Default::default() };
//! let mut sim = Simulator::from_cars(config, cars).unwrap();
//!
//! let report = sim.update();
//! assert_eq!(report.moved, 1);
//! assert_eq!(sim.cars()[0].position, GridPos::new(1, 1));
//! ```

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::car::Car;
use crate::config::SimConfig;
use crate::grid::{Direction, GridPos};
use crate::intersection::{Intersection, LightColor, Phase};
use crate::road::RoadNetwork;
use crate::SimError;

/// Attempts at drawing a reachable destination before a car is left unrouted.
const DESTINATION_ATTEMPTS: usize = 32;

// ---------------------------------------------------------------------------
// Exported state
// ---------------------------------------------------------------------------

/// A car as seen from outside the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    pub id: usize,
    pub position: GridPos,
    pub direction: Direction,
}

/// An intersection's light colors as seen from outside the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionState {
    pub position: GridPos,
    #[serde(rename = "NS")]
    pub ns: LightColor,
    #[serde(rename = "EW")]
    pub ew: LightColor,
}

/// Snapshot of the observable simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub time_step: u64,
    pub cars: Vec<CarState>,
    /// Ordered by position, x-major.
    pub intersections: Vec<IntersectionState>,
}

/// What happened to the cars during one [`Simulator::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// The step number this report describes.
    pub time_step: u64,
    pub moved: usize,
    /// Cars that would have left the grid.
    pub blocked_by_edge: usize,
    /// Cars facing a non-road cell.
    pub blocked_off_road: usize,
    /// Cars waiting at a red light.
    pub blocked_by_light: usize,
    /// Cars whose next cell was taken.
    pub blocked_by_car: usize,
    /// Routed cars that reached their destination this step.
    pub arrivals: usize,
}

impl StepReport {
    /// Total cars that stayed in place.
    pub fn blocked(&self) -> usize {
        self.blocked_by_edge + self.blocked_off_road + self.blocked_by_light + self.blocked_by_car
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Grid, cars and intersections, advanced in discrete steps.
///
/// The whole simulator (including the RNG state) is serializable, which is
/// what engine snapshots are built on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulator {
    config: SimConfig,
    time_step: u64,
    cars: Vec<Car>,
    /// Sorted by position for binary-search lookup.
    intersections: Vec<Intersection>,
    road_network: RoadNetwork,
    rng: Pcg64,
    total_arrivals: u64,
}

impl Simulator {
    /// Build a simulator with `config.num_cars` randomly placed cars.
    ///
    /// Cars are placed on distinct road cells that do not hold an
    /// intersection, each with a random heading. When routing is enabled
    /// every car also receives a random reachable destination.
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidConfig`] if the config fails validation.
    /// - [`SimError::NotEnoughSpace`] if there are fewer free road cells than
    ///   requested cars.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let mut sim = Self::empty(config)?;

        let mut free: Vec<GridPos> = sim
            .road_network
            .cells()
            .filter(|p| sim.intersection_at(*p).is_none())
            .collect();
        if free.len() < sim.config.num_cars {
            return Err(SimError::NotEnoughSpace {
                requested: sim.config.num_cars,
                available: free.len(),
            });
        }

        for id in 0..sim.config.num_cars {
            let position = free.swap_remove(sim.rng.gen_range(0..free.len()));
            let direction = Direction::ALL[sim.rng.gen_range(0..Direction::ALL.len())];
            sim.cars.push(Car::new(id, position, direction));
        }

        if sim.config.routing {
            for idx in 0..sim.cars.len() {
                sim.reroute(idx);
            }
        }

        tracing::info!(
            grid_size = sim.config.grid_size,
            cars = sim.cars.len(),
            intersections = sim.intersections.len(),
            road_cells = sim.road_network.len(),
            seed = sim.config.seed,
            "simulator initialized"
        );
        Ok(sim)
    }

    /// Build a simulator with explicitly placed cars.
    ///
    /// `config.num_cars` is overwritten with `cars.len()`. Car ids are kept
    /// as given. Cars may start on intersections. When routing is enabled,
    /// cars without a destination are given a random one, as in
    /// [`Simulator::new`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the config is invalid, if two
    /// cars share an id, or if a car sits off-road or shares a cell with
    /// another car.
    pub fn from_cars(mut config: SimConfig, cars: Vec<Car>) -> Result<Self, SimError> {
        config.num_cars = cars.len();
        let mut sim = Self::empty(config)?;

        let mut seen = HashSet::new();
        let mut ids = HashSet::new();
        for car in &cars {
            if !ids.insert(car.id) {
                return Err(SimError::InvalidConfig {
                    field: "cars",
                    reason: format!("car id {} is used more than once", car.id),
                });
            }
            if !sim.road_network.is_road(car.position) {
                return Err(SimError::InvalidConfig {
                    field: "cars",
                    reason: format!("car {} at {} is not on a road cell", car.id, car.position),
                });
            }
            if !seen.insert(car.position) {
                return Err(SimError::InvalidConfig {
                    field: "cars",
                    reason: format!("two cars share cell {}", car.position),
                });
            }
        }
        sim.cars = cars;

        if sim.config.routing {
            for idx in 0..sim.cars.len() {
                if sim.cars[idx].destination.is_none() {
                    sim.reroute(idx);
                }
            }
        }
        Ok(sim)
    }

    /// Roads and intersections, no cars.
    fn empty(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let road_network = RoadNetwork::from_layout(config.grid_size, &config.layout);
        let spacing = config.intersection_spacing as i32;
        let intersections = road_network
            .cells()
            .filter(|p| p.x % spacing == 0 && p.y % spacing == 0)
            .map(|p| Intersection::new(p, Some(Phase::NorthSouthGreen), config.intersection_cycle))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rng: Pcg64::seed_from_u64(config.seed),
            config,
            time_step: 0,
            cars: Vec::new(),
            intersections,
            road_network,
            total_arrivals: 0,
        })
    }

    // -- stepping -----------------------------------------------------------

    /// Advance the simulation by one step.
    pub fn update(&mut self) -> StepReport {
        self.time_step += 1;
        for intersection in &mut self.intersections {
            intersection.update_light();
        }

        let mut report = StepReport {
            time_step: self.time_step,
            ..Default::default()
        };
        let mut entered: HashSet<GridPos> = HashSet::with_capacity(self.cars.len());

        for idx in 0..self.cars.len() {
            if self.config.routing {
                self.cars[idx].next_move();
            }
            let direction = self.cars[idx].direction;
            let next = self.next_position(&self.cars[idx]);

            if !self.in_bounds(next) {
                report.blocked_by_edge += 1;
                continue;
            }
            if !self.road_network.is_road(next) {
                report.blocked_off_road += 1;
                continue;
            }
            if self
                .intersection_at(next)
                .is_some_and(|light| !light.is_green(direction))
            {
                report.blocked_by_light += 1;
                continue;
            }
            if entered.contains(&next) || self.cars.iter().any(|other| other.position == next) {
                report.blocked_by_car += 1;
                continue;
            }

            self.cars[idx].move_forward();
            entered.insert(next);
            report.moved += 1;

            if self.config.routing && self.cars[idx].has_arrived() {
                report.arrivals += 1;
                self.total_arrivals += 1;
                tracing::debug!(car = self.cars[idx].id, at = %next, "car reached destination");
                self.reroute(idx);
            }
        }

        tracing::debug!(
            step = report.time_step,
            moved = report.moved,
            blocked = report.blocked(),
            arrivals = report.arrivals,
            "step complete"
        );
        report
    }

    /// The cell `car` would move into.
    pub fn next_position(&self, car: &Car) -> GridPos {
        car.next_position()
    }

    /// Whether `pos` lies on the grid.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        let size = self.config.grid_size as i32;
        (0..size).contains(&pos.x) && (0..size).contains(&pos.y)
    }

    // -- routing ------------------------------------------------------------

    /// Shortest road path from `start` to `goal`, inclusive of both ends.
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
        self.road_network.find_path(start, goal)
    }

    /// Route car `car_id` to `destination` along a shortest road path.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownCar`] if no car has that id.
    /// - [`SimError::Unreachable`] if no road path exists.
    pub fn assign_route(&mut self, car_id: usize, destination: GridPos) -> Result<(), SimError> {
        let count = self.cars.len();
        let idx = self
            .cars
            .iter()
            .position(|c| c.id == car_id)
            .ok_or(SimError::UnknownCar { id: car_id, count })?;
        let from = self.cars[idx].position;
        let path = self
            .find_path(from, destination)
            .ok_or(SimError::Unreachable {
                from,
                to: destination,
            })?;
        self.cars[idx].set_route(destination, path);
        Ok(())
    }

    /// Draw a fresh random destination for the car at `idx`.
    fn reroute(&mut self, idx: usize) {
        let from = self.cars[idx].position;
        let cells: Vec<GridPos> = self.road_network.cells().filter(|p| *p != from).collect();
        if cells.is_empty() {
            self.cars[idx].clear_route();
            return;
        }

        for _ in 0..DESTINATION_ATTEMPTS {
            let goal = cells[self.rng.gen_range(0..cells.len())];
            if let Some(path) = self.road_network.find_path(from, goal) {
                self.cars[idx].set_route(goal, path);
                return;
            }
        }

        tracing::debug!(car = self.cars[idx].id, at = %from, "no reachable destination found");
        self.cars[idx].clear_route();
    }

    // -- state export -------------------------------------------------------

    /// The observable state, suitable for JSON export.
    pub fn get_state(&self) -> SimState {
        SimState {
            time_step: self.time_step,
            cars: self
                .cars
                .iter()
                .map(|c| CarState {
                    id: c.id,
                    position: c.position,
                    direction: c.direction,
                })
                .collect(),
            intersections: self
                .intersections
                .iter()
                .map(|i| {
                    let (ns, ew) = i.light_state();
                    IntersectionState {
                        position: i.position,
                        ns,
                        ew,
                    }
                })
                .collect(),
        }
    }

    /// ASCII picture of the grid.
    ///
    /// `.` is an empty road cell, a blank is off-road, `+` is an intersection
    /// with north-south green, `x` one with east-west green, and `C` a car
    /// (drawn over intersections). Cells are separated by spaces.
    pub fn render_ascii(&self) -> String {
        let size = self.config.grid_size as usize;
        let mut grid = vec![vec![' '; size]; size];

        for pos in self.road_network.cells() {
            grid[pos.y as usize][pos.x as usize] = '.';
        }
        for light in &self.intersections {
            let symbol = match light.phase() {
                Phase::NorthSouthGreen => '+',
                Phase::EastWestGreen => 'x',
            };
            grid[light.position.y as usize][light.position.x as usize] = symbol;
        }
        for car in self.cars.iter().filter(|c| self.in_bounds(c.position)) {
            grid[car.position.y as usize][car.position.x as usize] = 'C';
        }

        let mut out = String::with_capacity(6 + size * size * 2);
        out.push_str("Grid:\n");
        for row in grid {
            let line: Vec<String> = row.into_iter().map(String::from).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn grid_size(&self) -> u32 {
        self.config.grid_size
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Intersections in x-major position order.
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// The intersection at `pos`, if any.
    pub fn intersection_at(&self, pos: GridPos) -> Option<&Intersection> {
        self.intersections
            .binary_search_by_key(&pos, |i| i.position)
            .ok()
            .map(|idx| &self.intersections[idx])
    }

    pub fn road_network(&self) -> &RoadNetwork {
        &self.road_network
    }

    /// Arrivals since construction.
    pub fn total_arrivals(&self) -> u64 {
        self.total_arrivals
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
