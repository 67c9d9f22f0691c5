use dyn_clone::DynClone;
use serde::Serialize;

use crate::{model::ride::Ride, output::Assignment};

use super::{pool::Release, vehicle::VehicleId};

/// What happened to the ride pools during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: i64,
    pub bulk: Release,
    /// `None` when the active pool already held enough rides for the fleet.
    pub overflow: Option<Release>,
    pub pruned: usize,
    pub assigned: usize,
    pub pending: usize,
}

impl StepReport {
    pub fn activated(&self) -> usize {
        self.bulk.activated + self.overflow.map_or(0, |r| r.activated)
    }

    pub fn expired(&self) -> usize {
        self.bulk.expired + self.overflow.map_or(0, |r| r.expired) + self.pruned
    }
}

pub trait SimulationCallback: DynClone {
    fn visit_assignment(
        &mut self,
        _vehicle: VehicleId,
        _ride: &Ride,
        _step: i64,
        _pending: usize,
    ) {
    }
    fn visit_step(&mut self, _report: &StepReport) {}
    /// An error here fails the whole run.
    fn visit_finish(&mut self, _assignment: &Assignment) -> anyhow::Result<()> {
        Ok(())
    }
}

dyn_clone::clone_trait_object!(SimulationCallback);
