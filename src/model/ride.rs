use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use super::{narrow_i64, point::Point};

/// Position of a ride in the instance file, counted from zero.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RideId(pub usize);

impl Debug for RideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for RideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ride row as it appears in the instance file.
#[derive(Debug, Clone, Deserialize)]
pub struct RideRecord {
    #[serde(deserialize_with = "narrow_i64")]
    origin_x: i64,
    #[serde(deserialize_with = "narrow_i64")]
    origin_y: i64,
    #[serde(deserialize_with = "narrow_i64")]
    destination_x: i64,
    #[serde(deserialize_with = "narrow_i64")]
    destination_y: i64,
    #[serde(deserialize_with = "narrow_i64")]
    earliest_start: i64,
    #[serde(deserialize_with = "narrow_i64")]
    latest_finish: i64,
}

impl RideRecord {
    pub const FIELDS: usize = 6;

    pub fn into_ride(self, id: RideId) -> Ride {
        Ride::new(
            id,
            Point::new(self.origin_x, self.origin_y),
            Point::new(self.destination_x, self.destination_y),
            self.earliest_start,
            self.latest_finish,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ride {
    pub id: RideId,
    pub origin: Point,
    pub destination: Point,
    pub earliest_start: i64,
    pub latest_finish: i64,
    length: i64,
}

impl Ride {
    pub fn new(
        id: RideId,
        origin: Point,
        destination: Point,
        earliest_start: i64,
        latest_finish: i64,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            earliest_start,
            latest_finish,
            length: origin.distance(destination),
        }
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    // does not account for where the serving vehicle currently is
    pub fn on_time(&self, step: i64) -> bool {
        self.length + step <= self.latest_finish
    }

    pub fn is_released(&self, step: i64) -> bool {
        self.earliest_start <= step
    }
}

#[test]
fn test_ride_length_and_window() {
    let ride = Ride::new(RideId(3), Point::new(0, 0), Point::new(1, 1), 0, 2);
    assert_eq!(ride.length(), 2);
    assert!(ride.on_time(0));
    assert!(!ride.on_time(1));
    assert!(ride.is_released(0));

    let late = Ride::new(RideId(4), Point::new(2, 0), Point::new(2, 3), 5, 7);
    assert_eq!(late.length(), 3);
    assert!(!late.is_released(4));
    assert!(late.is_released(5));
    assert!(late.on_time(4));
    assert!(!late.on_time(5));
}
