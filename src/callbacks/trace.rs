use tracing::debug;

use crate::{
    model::ride::Ride,
    simulation::{callback::SimulationCallback, vehicle::VehicleId},
};

/// Logs every assignment together with the number of rides still pending.
#[derive(Debug, Clone, Default)]
pub struct TraceCallback {
    assigned: usize,
}

impl SimulationCallback for TraceCallback {
    fn visit_assignment(&mut self, vehicle: VehicleId, ride: &Ride, step: i64, pending: usize) {
        self.assigned += 1;
        debug!(
            %vehicle,
            ride = %ride.id,
            step,
            assigned = self.assigned,
            "{pending} rides left"
        );
    }
}
