//! `gridflow` -- open the traffic window or run the simulation in a terminal.
//!
//! ```text
//! gridflow                      # scaffold window: one car on a dark background
//! gridflow window --routing     # animated simulation in a window
//! gridflow run --steps 50       # ASCII animation in the terminal
//! gridflow run --no-visual      # one JSON state line per step
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gridflow_engine::prelude::*;

/// Title shown on every window.
const WINDOW_TITLE: &str = "Traffic Simulation (Scaffold)";

/// Grid traffic simulation.
#[derive(Parser)]
#[clap(name = "gridflow", version)]
struct Cli {
    /// Window width in pixels.
    #[clap(long, env = "GRIDFLOW_WIDTH", default_value_t = 800, global = true)]
    width: u32,

    /// Window height in pixels.
    #[clap(long, env = "GRIDFLOW_HEIGHT", default_value_t = 600, global = true)]
    height: u32,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Animate the simulation in a window.
    Window {
        #[clap(flatten)]
        sim: SimArgs,

        /// Seconds of wall time per simulation step.
        #[clap(long, env = "GRIDFLOW_DELAY", default_value_t = 0.2)]
        delay: f64,
    },
    /// Run the simulation in the terminal.
    Run {
        #[clap(flatten)]
        sim: SimArgs,

        /// Number of steps to simulate.
        #[clap(long, env = "GRIDFLOW_STEPS", default_value_t = 20)]
        steps: u64,

        /// Print one JSON state line per step instead of animating the grid.
        #[clap(long)]
        no_visual: bool,

        /// Seconds to pause between frames.
        #[clap(long, env = "GRIDFLOW_DELAY", default_value_t = 0.2)]
        delay: f64,

        /// Do not pause between frames.
        #[clap(long)]
        headless: bool,

        /// Write an engine snapshot (JSON) to FILE after the run.
        #[clap(long, value_name = "FILE")]
        snapshot_out: Option<PathBuf>,
    },
}

/// Simulation parameters. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
struct SimArgs {
    /// JSON config file.
    #[clap(long, env = "GRIDFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Grid edge length in cells.
    #[clap(long, env = "GRIDFLOW_GRID_SIZE")]
    grid_size: Option<u32>,

    /// Number of cars.
    #[clap(long, env = "GRIDFLOW_CARS")]
    cars: Option<usize>,

    /// Steps between traffic light changes.
    #[clap(long, env = "GRIDFLOW_CYCLE")]
    cycle: Option<u32>,

    /// Road layout: open, plus, or grid:<spacing>.
    #[clap(long, env = "GRIDFLOW_LAYOUT", value_parser = parse_layout)]
    layout: Option<RoadLayout>,

    /// RNG seed.
    #[clap(long, env = "GRIDFLOW_SEED")]
    seed: Option<u64>,

    /// Route cars to random destinations.
    #[clap(long, env = "GRIDFLOW_ROUTING")]
    routing: bool,
}

fn parse_layout(s: &str) -> Result<RoadLayout, String> {
    match s.split_once(':') {
        None if s == "open" => Ok(RoadLayout::Open),
        None if s == "plus" => Ok(RoadLayout::Plus),
        None if s == "grid" => Ok(RoadLayout::Grid { spacing: 3 }),
        Some(("grid", spacing)) => spacing
            .parse()
            .map(|spacing| RoadLayout::Grid { spacing })
            .map_err(|e| format!("invalid grid spacing '{spacing}': {e}")),
        _ => Err(format!("unknown layout '{s}', expected open, plus, or grid:<spacing>")),
    }
}

impl SimArgs {
    fn into_config(self) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if let Some(cars) = self.cars {
            config.num_cars = cars;
        }
        if let Some(cycle) = self.cycle {
            config.intersection_cycle = cycle;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.routing {
            config.routing = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn tick_loop(sim: SimArgs, delay: f64, headless: bool) -> Result<TickLoop, anyhow::Error> {
    if !(delay > 0.0 && delay.is_finite()) {
        anyhow::bail!("--delay must be a positive number of seconds, got {delay}");
    }
    let simulator = Simulator::new(sim.into_config()?)?;
    Ok(TickLoop::new(
        simulator,
        TickConfig {
            fixed_dt: delay,
            headless,
        },
    ))
}

/// Open the window: the scaffold scene when `tick_loop` is `None`,
/// otherwise the live simulation.
#[cfg(feature = "renderer")]
fn open_window(tick_loop: Option<TickLoop>, width: u32, height: u32) -> Result<(), anyhow::Error> {
    use gridflow_engine::render::{run_windowed, WindowContent};

    let content = match tick_loop {
        Some(tick_loop) => WindowContent::Simulation(tick_loop),
        None => WindowContent::Scaffold,
    };
    run_windowed(content, WINDOW_TITLE, width, height)
}

#[cfg(not(feature = "renderer"))]
fn open_window(_tick_loop: Option<TickLoop>, width: u32, height: u32) -> Result<(), anyhow::Error> {
    anyhow::bail!(
        "opening a {width}x{height} window needs the `renderer` feature; use `gridflow run` instead"
    )
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => open_window(None, cli.width, cli.height),
        Some(Command::Window { sim, delay }) => {
            let tick_loop = tick_loop(sim, delay, false)?;
            open_window(Some(tick_loop), cli.width, cli.height)
        }
        Some(Command::Run {
            sim,
            steps,
            no_visual,
            delay,
            headless,
            snapshot_out,
        }) => {
            let mut tick_loop = tick_loop(sim, delay, headless)?;
            let output = if no_visual { Output::Json } else { Output::Visual };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            run(&mut tick_loop, steps, output, &mut out)?;
            out.flush()?;

            if let Some(path) = snapshot_out {
                let json = tick_loop.capture_snapshot().to_json()?;
                std::fs::write(&path, json)?;
                tracing::info!(path = %path.display(), "wrote engine snapshot");
            }
            Ok(())
        }
    }
}
