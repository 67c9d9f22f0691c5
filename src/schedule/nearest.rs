use crate::{model::ride::Ride, simulation::vehicle::Vehicle};

use super::RideSelector;

/// Greedy nearest-neighbour: the pending ride whose origin is closest to the vehicle, earlier
/// and shorter rides first on equal distance.
#[derive(Debug, Default, Clone)]
pub struct NearestRideSelector;

impl RideSelector for NearestRideSelector {
    fn select(&mut self, vehicle: &Vehicle, pending: &mut [Ride]) -> Option<usize> {
        vehicle.closest_ride(pending)
    }

    fn name(&self) -> &'static str {
        "nearest-ride"
    }
}

#[test]
fn test_nearest_selector_delegates_to_vehicle() {
    use crate::model::{point::Point, ride::RideId};
    use crate::simulation::vehicle::VehicleId;

    let vehicle = Vehicle::new(VehicleId(0));
    let mut pending = vec![
        Ride::new(RideId(0), Point::new(3, 3), Point::new(4, 4), 0, 50),
        Ride::new(RideId(1), Point::new(1, 0), Point::new(4, 4), 0, 50),
    ];
    let mut selector = NearestRideSelector;
    let i = selector.select(&vehicle, &mut pending).unwrap();
    assert_eq!(pending[i].id, RideId(1));
    assert_eq!(selector.select(&vehicle, &mut []), None);
}
