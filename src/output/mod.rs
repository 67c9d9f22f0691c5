use serde::Serialize;

use crate::{model::ride::RideId, simulation::vehicle::Vehicle};

pub mod score;
pub mod validate;
pub mod writer;

pub use score::{score, Score};
pub use validate::{validate_file, validate_reader, ValidationError, ValidationSummary};

/// Ride ids served by each vehicle, one route per vehicle in fleet order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assignment {
    routes: Vec<Vec<RideId>>,
}

impl Assignment {
    pub fn new(routes: Vec<Vec<RideId>>) -> Self {
        Self { routes }
    }

    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        Self::new(
            vehicles
                .iter()
                .map(|v| v.rides().iter().map(|r| r.id).collect())
                .collect(),
        )
    }

    pub fn routes(&self) -> &[Vec<RideId>] {
        &self.routes
    }

    pub fn assigned_rides(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }
}
