//! Terminal runner: animates the grid as ASCII frames or streams JSON state.

use std::io::Write;

use crate::tick::TickLoop;

/// Clear screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How each step is written by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Clear the terminal and draw `Step N:` followed by the ASCII grid.
    Visual,
    /// One `Step N: <state JSON>` line per step.
    Json,
}

/// Run `steps` ticks, writing each resulting frame to `out`.
///
/// In [`Output::Visual`] mode the runner sleeps for one tick interval after
/// every frame, unless the tick loop is headless.
///
/// # Errors
///
/// Returns an error if writing to `out` fails or the state cannot be
/// serialized.
pub fn run<W: Write>(
    tick_loop: &mut TickLoop,
    steps: u64,
    output: Output,
    out: &mut W,
) -> Result<(), anyhow::Error> {
    let pace = !tick_loop.is_headless();
    tracing::info!(steps, ?output, pace, "starting terminal run");

    for _ in 0..steps {
        tick_loop.tick();
        let step = tick_loop.tick_count();
        match output {
            Output::Visual => {
                write!(out, "{CLEAR_SCREEN}")?;
                writeln!(out, "Step {step}:")?;
                writeln!(out)?;
                write!(out, "{}", tick_loop.simulator().render_ascii())?;
                writeln!(out)?;
                out.flush()?;
                if pace {
                    std::thread::sleep(tick_loop.tick_interval());
                }
            }
            Output::Json => {
                let state = serde_json::to_string(&tick_loop.simulator().get_state())?;
                writeln!(out, "Step {step}: {state}")?;
            }
        }
    }

    tracing::info!(
        ticks = tick_loop.tick_count(),
        arrivals = tick_loop.simulator().total_arrivals(),
        "terminal run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::TickConfig;
    use gridflow_sim::prelude::*;

    fn headless_loop() -> TickLoop {
        let sim = Simulator::new(SimConfig {
            grid_size: 6,
            num_cars: 3,
            ..Default::default()
        })
        .unwrap();
        TickLoop::new(
            sim,
            TickConfig {
                headless: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn json_output_has_one_line_per_step() {
        let mut tick_loop = headless_loop();
        let mut buf = Vec::new();
        run(&mut tick_loop, 4, Output::Json, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        for (i, line) in lines.iter().enumerate() {
            let prefix = format!("Step {}: ", i + 1);
            let json = line.strip_prefix(&prefix).expect("line starts with step label");
            let state: SimState = serde_json::from_str(json).unwrap();
            assert_eq!(state.time_step, i as u64 + 1);
            assert_eq!(state.cars.len(), 3);
        }
    }

    #[test]
    fn visual_output_clears_and_draws_each_frame() {
        let mut tick_loop = headless_loop();
        let mut buf = Vec::new();
        run(&mut tick_loop, 2, Output::Visual, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches(CLEAR_SCREEN).count(), 2);
        assert!(text.contains("Step 1:\n\nGrid:\n"));
        assert!(text.contains("Step 2:"));
        assert_eq!(text.matches('C').count(), 6);
    }
}
