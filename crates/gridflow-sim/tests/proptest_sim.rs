//! Property tests for the simulator.
//!
//! These tests generate random configurations and verify that the movement
//! invariants hold after every step.

use std::collections::HashSet;

use gridflow_sim::prelude::*;
use proptest::prelude::*;

fn layout_strategy() -> impl Strategy<Value = RoadLayout> {
    prop_oneof![
        Just(RoadLayout::Open),
        (1u32..5).prop_map(|spacing| RoadLayout::Grid { spacing }),
        Just(RoadLayout::Plus),
    ]
}

fn config_strategy() -> impl Strategy<Value = SimConfig> {
    (
        3u32..14,
        0usize..12,
        1u32..8,
        1u32..5,
        layout_strategy(),
        any::<u64>(),
        any::<bool>(),
    )
        .prop_map(
            |(
                grid_size,
                num_cars,
                intersection_cycle,
                intersection_spacing,
                layout,
                seed,
                routing,
            )| {
                SimConfig {
                    grid_size,
                    num_cars,
                    intersection_cycle,
                    intersection_spacing,
                    layout,
                    seed,
                    routing,
                }
            },
        )
}

fn assert_invariants(sim: &Simulator) -> Result<(), TestCaseError> {
    let mut occupied = HashSet::new();
    for car in sim.cars() {
        prop_assert!(sim.in_bounds(car.position), "{car} left the grid");
        prop_assert!(
            sim.road_network().is_road(car.position),
            "{car} is off-road"
        );
        prop_assert!(occupied.insert(car.position), "two cars share {}", car.position);
    }
    for light in sim.intersections() {
        let (ns, ew) = light.light_state();
        prop_assert_ne!(ns, ew, "exactly one axis is green at {}", light.position);
        prop_assert!(light.timer() < light.cycle_length());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_runs_preserve_invariants(config in config_strategy(), steps in 1usize..40) {
        let Ok(mut sim) = Simulator::new(config) else {
            // Too many cars for the layout; nothing to check.
            return Ok(());
        };
        assert_invariants(&sim)?;
        for _ in 0..steps {
            let report = sim.update();
            prop_assert_eq!(report.moved + report.blocked(), sim.cars().len());
            assert_invariants(&sim)?;
        }
        prop_assert_eq!(sim.time_step(), steps as u64);
    }

    #[test]
    fn seeded_runs_are_deterministic(config in config_strategy(), steps in 1usize..30) {
        let (Ok(mut a), Ok(mut b)) = (Simulator::new(config.clone()), Simulator::new(config)) else {
            return Ok(());
        };
        for _ in 0..steps {
            prop_assert_eq!(a.update(), b.update());
        }
        prop_assert_eq!(a.get_state(), b.get_state());
        prop_assert_eq!(a.render_ascii(), b.render_ascii());
    }

    #[test]
    fn cars_move_at_most_one_cell(config in config_strategy()) {
        let Ok(mut sim) = Simulator::new(config) else {
            return Ok(());
        };
        for _ in 0..20 {
            let before: Vec<GridPos> = sim.cars().iter().map(|c| c.position).collect();
            sim.update();
            for (car, prev) in sim.cars().iter().zip(before) {
                prop_assert!(car.position.manhattan(prev) <= 1);
            }
        }
    }
}
