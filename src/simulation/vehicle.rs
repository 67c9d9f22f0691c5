use std::fmt::{Debug, Display};

use serde::Serialize;

use crate::model::{point::Point, ride::Ride};

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VehicleId(pub usize);

impl Debug for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    position: Point,
    busy_until: i64,
    clock: i64,
    idle: bool,
    rides: Vec<Ride>,
}

impl Vehicle {
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            position: Point::ORIGIN,
            busy_until: 0,
            clock: 0,
            idle: true,
            rides: Vec::new(),
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn busy_until(&self) -> i64 {
        self.busy_until
    }

    /// Rides in the order they were committed.
    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn is_available(&self) -> bool {
        self.idle
    }

    pub fn distance_to(&self, point: Point) -> i64 {
        self.position.distance(point)
    }

    /// Takes the ride: drives to its origin, then to its destination. Waiting for the ride's
    /// earliest start is not accounted for.
    pub fn commit(&mut self, ride: Ride) {
        self.idle = false;
        self.busy_until = self.clock + self.distance_to(ride.origin);
        self.position = ride.origin;
        self.busy_until += self.distance_to(ride.destination);
        self.position = ride.destination;
        self.rides.push(ride);
    }

    /// Advances the vehicle clock by one step. Must run once per step, after any commit.
    pub fn tick(&mut self) {
        self.clock += 1;
        if self.busy_until < self.clock {
            self.idle = true;
        }
    }

    /// Sorts `pending` by `(earliest_start, length)` and returns the position of the first
    /// ride whose origin is nearest to this vehicle.
    pub fn closest_ride(&self, pending: &mut [Ride]) -> Option<usize> {
        pending.sort_by_key(|ride| (ride.earliest_start, ride.length()));
        // first of equal minima wins
        pending
            .iter()
            .enumerate()
            .min_by_key(|(_, ride)| self.distance_to(ride.origin))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
fn ride(id: usize, origin: (i64, i64), destination: (i64, i64), earliest_start: i64) -> Ride {
    use crate::model::ride::RideId;

    Ride::new(
        RideId(id),
        Point::new(origin.0, origin.1),
        Point::new(destination.0, destination.1),
        earliest_start,
        100,
    )
}

#[test]
fn test_commit_moves_and_books_vehicle() {
    let mut vehicle = Vehicle::new(VehicleId(0));
    assert!(vehicle.is_available());

    vehicle.tick();
    vehicle.tick();
    vehicle.commit(ride(7, (1, 2), (4, 2), 0));
    assert!(!vehicle.is_available());
    // clock 2, 3 steps to the origin, 3 steps of ride
    assert_eq!(vehicle.busy_until(), 8);
    assert_eq!(vehicle.position(), Point::new(4, 2));
    assert_eq!(vehicle.rides().len(), 1);
}

#[test]
fn test_tick_frees_vehicle_after_busy_until() {
    let mut vehicle = Vehicle::new(VehicleId(0));
    vehicle.commit(ride(0, (0, 0), (1, 1), 0));
    assert_eq!(vehicle.busy_until(), 2);

    vehicle.tick(); // clock 1
    assert!(!vehicle.is_available());
    vehicle.tick(); // clock 2
    assert!(!vehicle.is_available());
    vehicle.tick(); // clock 3
    assert!(vehicle.is_available());
}

#[test]
fn test_closest_ride_prefers_nearest_origin() {
    let mut vehicle = Vehicle::new(VehicleId(0));
    vehicle.commit(ride(0, (0, 0), (5, 5), 0));
    let mut pending = vec![
        ride(1, (0, 0), (1, 0), 0),
        ride(2, (5, 4), (9, 9), 3),
        ride(3, (6, 6), (6, 7), 1),
    ];
    let i = vehicle.closest_ride(&mut pending).unwrap();
    assert_eq!(pending[i].id.0, 2);
}

#[test]
fn test_closest_ride_breaks_ties_by_start_then_length() {
    let vehicle = Vehicle::new(VehicleId(0));
    let mut pending = vec![
        ride(1, (1, 0), (9, 0), 2),
        ride(2, (0, 1), (0, 5), 1),
        ride(3, (1, 0), (2, 0), 1),
    ];
    let i = vehicle.closest_ride(&mut pending).unwrap();
    assert_eq!(pending[i].id.0, 3);
    let order: Vec<_> = pending.iter().map(|r| r.id.0).collect();
    assert_eq!(order, vec![3, 2, 1]);
}

#[test]
fn test_closest_ride_on_empty_pool() {
    let vehicle = Vehicle::new(VehicleId(0));
    assert_eq!(vehicle.closest_ride(&mut []), None);
}
