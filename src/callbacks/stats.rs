use std::path::PathBuf;

use anyhow::Context as _;
use serde::Serialize;
use tracing::info;

use crate::{
    config::SchedulerConfig,
    output::Assignment,
    simulation::callback::{SimulationCallback, StepReport},
};

use super::dump_json;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub config: SchedulerConfig,
    pub steps: usize,
    pub activated: usize,
    pub expired: usize,
    pub overflow_openings: usize,
    pub assigned: usize,
    pub peak_pending: usize,
    pub rides_per_vehicle: Vec<usize>,
}

/// Accumulates [`RunStats`] over a run and writes them as JSON when the run finishes.
#[derive(Debug, Clone)]
pub struct StatsCallback {
    path: PathBuf,
    stats: RunStats,
}

impl StatsCallback {
    pub fn new(path: impl Into<PathBuf>, config: SchedulerConfig) -> Self {
        Self {
            path: path.into(),
            stats: RunStats {
                config,
                ..Default::default()
            },
        }
    }
}

impl SimulationCallback for StatsCallback {
    fn visit_step(&mut self, report: &StepReport) {
        let stats = &mut self.stats;
        stats.steps += 1;
        stats.activated += report.activated();
        stats.expired += report.expired();
        stats.assigned += report.assigned;
        stats.peak_pending = stats.peak_pending.max(report.pending);
        if report.overflow.is_some() {
            stats.overflow_openings += 1;
        }
    }

    fn visit_finish(&mut self, assignment: &Assignment) -> anyhow::Result<()> {
        self.stats.rides_per_vehicle = assignment.routes().iter().map(Vec::len).collect();
        dump_json(&self.path, &self.stats)
            .with_context(|| format!("unable to write run summary {}", self.path.display()))?;
        info!(path = %self.path.display(), "run summary written");
        Ok(())
    }
}

#[test]
fn test_stats_summary_is_written_on_finish() {
    use crate::{model::instance::Instance, simulation::simulator::Simulator};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    let instance: Instance = "10 10 2 3 0 10\n0 0 1 1 0 10\n2 2 3 3 0 10\n0 0 1 0 0 0\n"
        .parse()
        .unwrap();
    let config = SchedulerConfig::default();
    let mut sim = Simulator::new(instance, config.clone());
    sim.add_callback(Box::new(StatsCallback::new(&path, config)));
    sim.run().unwrap();

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(summary["steps"], 10);
    // the ride that is already late is activated, then pruned in the same step
    assert_eq!(summary["activated"], 3);
    assert_eq!(summary["expired"], 1);
    assert_eq!(summary["assigned"], 2);
    assert_eq!(summary["rides_per_vehicle"], serde_json::json!([1, 1]));
    assert_eq!(summary["config"]["boundary"], "drop");
    assert_eq!(summary["config"]["overflow_pool_size"], 1000);
}

#[test]
fn test_unwritable_summary_fails_the_run() {
    use crate::{model::instance::Instance, simulation::simulator::Simulator};

    // a regular file where the summary's parent directory should be
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().join("summary.json");
    let instance: Instance = "2 2 1 1 1 2\n0 0 1 1 0 2\n".parse().unwrap();
    let config = SchedulerConfig::default();
    let mut sim = Simulator::new(instance, config.clone());
    sim.add_callback(Box::new(StatsCallback::new(&path, config)));

    let err = sim.run().unwrap_err();
    assert!(format!("{err:#}").contains("unable to write run summary"), "{err:#}");
    assert!(!path.exists());
}
