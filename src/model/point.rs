use std::fmt::{Debug, Display};

use serde::Serialize;

/// A grid intersection.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance, the number of steps a vehicle needs between two intersections.
    pub fn distance(&self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[test]
fn test_manhattan_distance() {
    let a = Point::new(1, 5);
    let b = Point::new(4, 1);
    assert_eq!(a.distance(b), 7);
    assert_eq!(b.distance(a), 7);
    assert_eq!(a.distance(a), 0);
    assert_eq!(Point::ORIGIN.distance(Point::new(-2, 3)), 5);
}
