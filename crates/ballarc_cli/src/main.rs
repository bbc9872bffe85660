//! ballarc CLI
//!
//! Solve a flight between two screen points and print its state, or dump every frame.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use ballarc_core::{
    default_table, params, ArcParams, AscentFloorPolicy, Container, ParamsTable, ScreenPoint,
    Trajectory, TrajectoryError, TrajectoryRequest, TrajectoryState, DEFAULT_FPS,
};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ballarc")]
#[command(about = "Solve and sample endpoint-matched ball arcs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Prepare a flight and print the solved state as JSON
    Solve(FlightArgs),

    /// Print every frame of a flight in screen coordinates
    Sample {
        #[command(flatten)]
        flight: FlightArgs,

        /// Frames per second
        #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Print the embedded parameter table
    Params {
        /// Only list the profile names, default first
        #[arg(long)]
        list: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct FlightArgs {
    /// Start point as X,Y (y measured from the container bottom)
    #[arg(long, value_parser = parse_pair)]
    from: (f64, f64),

    /// End point as X,Y (y measured from the container bottom)
    #[arg(long, value_parser = parse_pair)]
    to: (f64, f64),

    /// Flight time in seconds
    #[arg(long)]
    duration: f64,

    /// Container size as W,H
    #[arg(long, value_parser = parse_pair, default_value = "800,400")]
    container: (f64, f64),

    /// Interpret --from/--to as percentages of the container
    #[arg(long, default_value = "false")]
    percent: bool,

    /// Parameter table (YAML). Defaults to the embedded table
    #[arg(long)]
    params: Option<PathBuf>,

    /// Profile name in the parameter table
    #[arg(long)]
    profile: Option<String>,

    /// Override gravity (px/s²)
    #[arg(long)]
    gravity: Option<f64>,

    /// Override the ascent velocity floor (px/s)
    #[arg(long)]
    floor: Option<f64>,

    /// Override the lateral curve magnitude (px)
    #[arg(long)]
    curve: Option<f64>,

    /// Override the floor policy (stretch_duration, keep_duration, reject)
    #[arg(long)]
    policy: Option<AscentFloorPolicy>,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct SolveReport {
    from: ScreenPoint,
    to: ScreenPoint,
    landing: ScreenPoint,
    apex: ScreenPoint,
    apex_time: f64,
    lands_exactly: bool,
    params: ArcParams,
    state: TrajectoryState,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct FrameRow {
    frame: usize,
    elapsed: f64,
    x: f64,
    y: f64,
}

#[cfg(feature = "cli")]
fn parse_pair(s: &str) -> std::result::Result<(f64, f64), String> {
    let (a, b) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got {s}"))?;
    let a = a.trim().parse::<f64>().map_err(|e| format!("{a}: {e}"))?;
    let b = b.trim().parse::<f64>().map_err(|e| format!("{b}: {e}"))?;
    Ok((a, b))
}

/// Attach a retry hint to errors the caller can fix by changing the flight.
#[cfg(feature = "cli")]
fn with_hint(err: TrajectoryError) -> anyhow::Error {
    if err.is_recoverable() {
        anyhow::Error::new(err).context("flight rejected; adjust --duration or --fps and retry")
    } else {
        err.into()
    }
}

/// Profile names of `table`, the default one first.
#[cfg(feature = "cli")]
fn profile_listing(table: &ParamsTable) -> Vec<&str> {
    let mut names = vec![table.default_profile.as_str()];
    names.extend(table.profile_names().filter(|n| *n != table.default_profile));
    names
}

#[cfg(feature = "cli")]
impl FlightArgs {
    fn resolve_params(&self) -> Result<ArcParams> {
        let loaded;
        let table: &ParamsTable = match &self.params {
            Some(path) => {
                loaded = ParamsTable::from_path(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                &loaded
            }
            None => default_table(),
        };
        let mut params = match &self.profile {
            Some(name) => *table.profile(name)?,
            None => *table.default_params(),
        };
        if let Some(g) = self.gravity {
            params = params.with_gravity(g);
        }
        if let Some(v) = self.floor {
            params = params.with_min_ascent_velocity(v);
        }
        if let Some(c) = self.curve {
            params = params.with_lateral_curve(c);
        }
        if let Some(p) = self.policy {
            params = params.with_floor_policy(p);
        }
        params.validate()?;
        Ok(params)
    }

    fn prepare(&self) -> Result<(Container, ScreenPoint, ScreenPoint, ArcParams, Trajectory)> {
        let container = Container::new(self.container.0, self.container.1)?;
        let (from, to) = if self.percent {
            (
                container.at_percent(self.from.0, self.from.1),
                container.at_percent(self.to.0, self.to.1),
            )
        } else {
            (ScreenPoint::new(self.from.0, self.from.1), ScreenPoint::new(self.to.0, self.to.1))
        };
        let params = self.resolve_params()?;
        let request = TrajectoryRequest::new(
            container.to_physics(from),
            container.to_physics(to),
            self.duration,
        )
        .map_err(with_hint)?;
        let trajectory = Trajectory::prepare(request, &params).map_err(with_hint)?;
        Ok((container, from, to, params, trajectory))
    }
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(flight) => {
            let (container, from, to, params, trajectory) = flight.prepare()?;
            let apex = trajectory.apex();
            let report = SolveReport {
                from,
                to,
                landing: container.to_screen(trajectory.landing()),
                apex: container.to_screen(apex.position),
                apex_time: apex.elapsed,
                lands_exactly: trajectory.lands_exactly(),
                params,
                state: trajectory.state,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Sample { flight, fps, format } => {
            let (container, _, _, _, trajectory) = flight.prepare()?;
            let rows: Vec<FrameRow> = trajectory
                .sample(fps)
                .map_err(with_hint)?
                .into_iter()
                .enumerate()
                .map(|(frame, s)| {
                    let p = container.to_screen(s.position);
                    FrameRow { frame, elapsed: s.elapsed, x: p.x, y: p.y }
                })
                .collect();
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                Format::Csv => {
                    println!("frame,elapsed,x,y");
                    for r in &rows {
                        println!("{},{:.6},{:.6},{:.6}", r.frame, r.elapsed, r.x, r.y);
                    }
                }
            }
        }

        Commands::Params { list: true } => {
            for name in profile_listing(default_table()) {
                println!("{name}");
            }
        }

        Commands::Params { list: false } => {
            print!("{}", params::default_table_yaml());
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("ballarc CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
