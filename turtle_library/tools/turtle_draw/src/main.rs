//! # turtle_draw - Open-loop turtle drawing
//!
//! One command, drawing controller + headless simulator.
//!
//! Usage:
//!   turtle_draw                                  # Built-in figure, simulated time
//!   turtle_draw --choreography star.toml         # Custom drawing steps
//!   turtle_draw --config draw.toml               # Controller/simulator tuning
//!   turtle_draw --realtime                       # Pace commands against the wall clock
//!   turtle_draw --trail-out trail.json           # Export what was drawn
//!
//! Logging follows `RUST_LOG`; `--verbose` switches the default to debug.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use turtle_core::communication::service;
use turtle_core::{Clock, EventPump, Hub, Scheduler};
use turtle_library::{
    Choreography, CmdVel, DrawConfig, DrawHandles, DrawStats, Kill, Pose2D, SetPen, SimServers,
    SimWorld, Spawn, TurtleDrawNode, TurtleSimNode,
};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "turtle_draw")]
#[command(about = "Drive a simulated turtle through a drawing choreography")]
pub struct Args {
    /// Controller and simulator configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drawing steps (TOML); the built-in figure when omitted
    #[arg(long)]
    choreography: Option<PathBuf>,

    /// Sleep between control ticks instead of stepping simulated time
    #[arg(long)]
    realtime: bool,

    /// Control period in seconds, overriding the config file
    #[arg(long)]
    period: Option<f64>,

    /// Velocity command topic
    #[arg(long, default_value = "/turtle1/cmd_vel")]
    topic: String,

    /// Write the simulated world (poses and trail) as JSON
    #[arg(long)]
    trail_out: Option<PathBuf>,

    /// Debug logging, including the simulator node's own logs
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(args: &Args) -> Result<DrawConfig> {
    let mut config = match &args.config {
        Some(path) => DrawConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DrawConfig::default(),
    };

    if let Some(period) = args.period {
        config.control_period = period;
        config.validate().context("invalid --period")?;
    }
    Ok(config)
}

fn load_choreography(args: &Args) -> Result<Choreography> {
    match &args.choreography {
        Some(path) => Choreography::from_file(path)
            .with_context(|| format!("loading choreography {}", path.display())),
        None => Ok(Choreography::figure()),
    }
}

/// What a run leaves behind
struct RunReport {
    stats: DrawStats,
    world: SimWorld,
    /// Scheduler time when the controller finished
    elapsed: Duration,
}

fn run(args: &Args) -> Result<RunReport> {
    let config = load_config(args)?;
    let choreography = load_choreography(args)?;
    if choreography.is_empty() {
        warn!("choreography has no steps");
    }

    let cmd_vel: Hub<CmdVel> = Hub::new(&args.topic)?;
    let (pen, set_pen) = service::pair::<SetPen>("/turtle1/set_pen");
    let (spawn, spawn_server) = service::pair::<Spawn>("spawn");
    let (kill, kill_server) = service::pair::<Kill>("kill");

    let start = Pose2D::new(
        config.sim.start_x,
        config.sim.start_y,
        config.sim.start_theta,
    );
    let sim = TurtleSimNode::new(
        cmd_vel.clone(),
        SimServers {
            set_pen,
            spawn: spawn_server,
            kill: kill_server,
        },
        start,
        config.control_period,
    );
    let world = sim.world();

    let mut scheduler = Scheduler::new()
        .with_period(config.control_period_duration())
        .name("turtle_draw");
    if args.realtime {
        scheduler = scheduler.realtime();
    }
    scheduler.add(Box::new(sim), 0, Some(args.verbose));
    // The simulator advertises its services on its first tick
    scheduler.spin_once();
    let clock = scheduler.clock();

    info!(
        "Simulated turtle starts at ({:.2}, {:.2}); the controller assumes the origin",
        start.x, start.y
    );

    let handles = DrawHandles {
        cmd_vel: Box::new(cmd_vel.clone()),
        pen: Box::new(pen),
        spawn: Box::new(spawn),
        kill: Box::new(kill),
        pump: Box::new(scheduler),
        clock: clock.clone(),
    };
    let mut node = TurtleDrawNode::new(handles, config).context("creating controller")?;

    choreography.run(&mut node);
    let stats = *node.stats();
    node.shutdown();

    let metrics = cmd_vel.get_metrics();
    if metrics.messages_dropped > 0 {
        warn!("{} velocity commands were dropped", metrics.messages_dropped);
    }

    Ok(RunReport {
        stats,
        world,
        elapsed: clock.now(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!(" Starting turtle_draw");
    if args.realtime {
        info!("   Real-time pacing");
    } else {
        info!("   Simulated time");
    }

    let report = run(&args)?;

    info!(
        "Done: {} after {:.1}s",
        serde_json::to_string(&report.stats)?,
        report.elapsed.as_secs_f64()
    );
    if let Some(pose) = report.world.pose(turtle_library::nodes::MAIN_TURTLE) {
        info!(
            "Simulated turtle ended at ({:.3}, {:.3}, {:.3}), {:.2} units of ink",
            pose.x,
            pose.y,
            pose.theta,
            report.world.ink_length()
        );
    }

    if let Some(path) = &args.trail_out {
        let json = report.world.to_json()?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("Trail written to {}", path.display());
    }

    Ok(())
}
