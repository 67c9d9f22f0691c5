use std::{path::PathBuf, time::Instant};

use anyhow::Context as _;
use clap::Parser;
use humantime::format_duration;
use ride_dispatch::{
    callbacks::{StatsCallback, TraceCallback},
    config::{BoundaryPolicy, SchedulerConfig},
    model::instance::Instance,
    output::{score, validate_file},
    simulation::simulator::Simulator,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Greedily assigns time-windowed rides to a vehicle fleet.
#[derive(Parser)]
#[command(name = "ride_dispatch", version)]
struct Cli {
    /// Instance file
    instance: PathBuf,
    /// Where the assignment is written
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,
    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Number of longest rides held back until demand is low
    #[arg(long, default_value_t = 1000)]
    overflow_size: usize,
    /// Schedule the ride on the bulk/overflow boundary instead of dropping it
    #[arg(long)]
    keep_boundary_ride: bool,
    /// Never expire rides once they are in the active pool
    #[arg(long)]
    keep_stale_active: bool,
}

impl Cli {
    fn config(&self) -> SchedulerConfig {
        SchedulerConfig::new()
            .overflow_pool_size(self.overflow_size)
            .boundary(if self.keep_boundary_ride {
                BoundaryPolicy::Keep
            } else {
                BoundaryPolicy::Drop
            })
            .prune_active(!self.keep_stale_active)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();
    let config = cli.config();

    let instance = Instance::load(&cli.instance)
        .with_context(|| format!("unable to load instance {}", cli.instance.display()))?;

    let start = Instant::now();
    let mut sim = Simulator::new(instance.clone(), config.clone());
    sim.add_callback(Box::new(TraceCallback::default()));
    if let Some(path) = &cli.summary {
        sim.add_callback(Box::new(StatsCallback::new(path, config)));
    }
    let assignment = sim.run()?;
    info!("simulation time: {}", format_duration(start.elapsed()));

    assignment
        .save(&cli.output)
        .with_context(|| format!("unable to write assignment {}", cli.output.display()))?;
    let summary = validate_file(&cli.output).context("invalid assignment")?;
    summary
        .check_against(&instance)
        .context("assignment does not fit the instance")?;

    let score = score(&instance, &assignment);
    info!(
        assigned = summary.assigned_rides(),
        rides = instance.rides.len(),
        on_time = score.on_time,
        bonus_rides = score.bonus_rides,
        late = score.late,
        "score {}",
        score.total
    );
    Ok(())
}
