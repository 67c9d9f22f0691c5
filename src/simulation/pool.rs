use serde::Serialize;
use tracing::trace;

use crate::{config::BoundaryPolicy, model::ride::Ride};

/// The length-sorted ride list split into the bulk pool and the pool of the longest rides.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub bulk: Vec<Ride>,
    pub overflow: Vec<Ride>,
    pub dropped: Option<Ride>,
}

/// Sorts `rides` by length (stable, so equal lengths keep parse order) and moves the
/// `overflow_size` longest rides into the overflow pool. With [`BoundaryPolicy::Drop`] the
/// shortest of those is set aside instead of being scheduled. When there are fewer rides than
/// `overflow_size` everything lands in the overflow pool.
pub fn partition(
    mut rides: Vec<Ride>,
    overflow_size: usize,
    boundary: BoundaryPolicy,
) -> Partition {
    rides.sort_by_key(Ride::length);
    let split = rides.len().saturating_sub(overflow_size);
    let mut overflow = rides.split_off(split);
    let dropped = match boundary {
        BoundaryPolicy::Drop if overflow_size > 0 && overflow.len() == overflow_size => {
            Some(overflow.remove(0))
        }
        _ => None,
    };
    Partition {
        bulk: rides,
        overflow,
        dropped,
    }
}

/// Outcome of scanning a waiting pool at one step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Release {
    pub activated: usize,
    pub expired: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RidePools {
    bulk: Vec<Ride>,
    overflow: Vec<Ride>,
    active: Vec<Ride>,
}

impl RidePools {
    pub fn new(partition: Partition) -> Self {
        Self {
            bulk: partition.bulk,
            overflow: partition.overflow,
            active: Vec::new(),
        }
    }

    pub fn release_bulk(&mut self, step: i64) -> Release {
        release_into(&mut self.bulk, &mut self.active, step)
    }

    pub fn release_overflow(&mut self, step: i64) -> Release {
        release_into(&mut self.overflow, &mut self.active, step)
    }

    /// Drops active rides that can no longer finish in time, returns how many went.
    pub fn prune_active(&mut self, step: i64) -> usize {
        let before = self.active.len();
        self.active.retain(|ride| ride.on_time(step));
        before - self.active.len()
    }

    pub fn active(&self) -> &[Ride] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Vec<Ride> {
        &mut self.active
    }

    pub fn bulk(&self) -> &[Ride] {
        &self.bulk
    }

    pub fn overflow(&self) -> &[Ride] {
        &self.overflow
    }

    /// Rides not yet released into the active pool.
    pub fn waiting(&self) -> usize {
        self.bulk.len() + self.overflow.len()
    }
}

// Drains the pool and rebuilds it from the rides that are neither due nor expired, so no
// ride is skipped while the pool shrinks. A due ride is activated even when it is already
// late; the active pool is where it gets pruned.
fn release_into(pool: &mut Vec<Ride>, active: &mut Vec<Ride>, step: i64) -> Release {
    let mut release = Release::default();
    let waiting = std::mem::take(pool);
    pool.reserve(waiting.len());
    for ride in waiting {
        if ride.is_released(step) {
            release.activated += 1;
            active.push(ride);
        } else if !ride.on_time(step) {
            trace!(ride = %ride.id, step, "ride expired before release");
            release.expired += 1;
        } else {
            pool.push(ride);
        }
    }
    release
}

#[cfg(test)]
fn ride(id: usize, length: i64, earliest_start: i64, latest_finish: i64) -> Ride {
    use crate::model::{point::Point, ride::RideId};

    Ride::new(
        RideId(id),
        Point::new(0, 0),
        Point::new(length, 0),
        earliest_start,
        latest_finish,
    )
}

#[cfg(test)]
fn ids(rides: &[Ride]) -> Vec<usize> {
    rides.iter().map(|r| r.id.0).collect()
}

#[test]
fn test_partition_drops_boundary_ride() {
    let rides = vec![
        ride(0, 5, 0, 100),
        ride(1, 1, 0, 100),
        ride(2, 4, 0, 100),
        ride(3, 2, 0, 100),
        ride(4, 3, 0, 100),
    ];
    let p = partition(rides, 3, BoundaryPolicy::Drop);
    assert_eq!(ids(&p.bulk), vec![1, 3]);
    assert_eq!(p.dropped.map(|r| r.id.0), Some(4));
    assert_eq!(ids(&p.overflow), vec![2, 0]);
}

#[test]
fn test_partition_keeps_boundary_ride_when_asked() {
    let rides = vec![
        ride(0, 5, 0, 100),
        ride(1, 1, 0, 100),
        ride(2, 4, 0, 100),
        ride(3, 2, 0, 100),
        ride(4, 3, 0, 100),
    ];
    let p = partition(rides, 3, BoundaryPolicy::Keep);
    assert_eq!(ids(&p.bulk), vec![1, 3]);
    assert!(p.dropped.is_none());
    assert_eq!(ids(&p.overflow), vec![4, 2, 0]);
}

#[test]
fn test_partition_small_instances() {
    let p = partition(vec![ride(0, 2, 0, 2)], 1000, BoundaryPolicy::Drop);
    assert!(p.bulk.is_empty());
    assert!(p.dropped.is_none());
    assert_eq!(ids(&p.overflow), vec![0]);

    let p = partition(vec![ride(0, 2, 0, 9), ride(1, 1, 0, 9)], 0, BoundaryPolicy::Drop);
    assert_eq!(ids(&p.bulk), vec![1, 0]);
    assert!(p.overflow.is_empty());
    assert!(p.dropped.is_none());

    // exactly as many rides as the overflow pool holds: the shortest one is the boundary
    let p = partition(vec![ride(0, 2, 0, 9), ride(1, 1, 0, 9)], 2, BoundaryPolicy::Drop);
    assert!(p.bulk.is_empty());
    assert_eq!(p.dropped.map(|r| r.id.0), Some(1));
    assert_eq!(ids(&p.overflow), vec![0]);
}

#[test]
fn test_partition_is_stable_on_equal_lengths() {
    let rides = (0..6).map(|i| ride(i, 3, 0, 10)).collect();
    let p = partition(rides, 2, BoundaryPolicy::Keep);
    assert_eq!(ids(&p.bulk), vec![0, 1, 2, 3]);
    assert_eq!(ids(&p.overflow), vec![4, 5]);
}

#[test]
fn test_release_activates_due_and_expires_late_rides() {
    let mut pools = RidePools::new(Partition {
        bulk: vec![
            ride(0, 2, 0, 10),
            ride(1, 2, 3, 10),
            // due and already late: still activated
            ride(2, 5, 0, 4),
            ride(3, 1, 1, 10),
            // not due yet and can no longer finish
            ride(4, 3, 5, 3),
        ],
        overflow: vec![],
        dropped: None,
    });

    let release = pools.release_bulk(1);
    assert_eq!(
        release,
        Release {
            activated: 3,
            expired: 1
        }
    );
    assert_eq!(ids(pools.active()), vec![0, 2, 3]);
    assert_eq!(ids(pools.bulk()), vec![1]);
    assert_eq!(pools.waiting(), 1);
    assert_eq!(pools.prune_active(1), 1);
    assert_eq!(ids(pools.active()), vec![0, 3]);

    let release = pools.release_bulk(3);
    assert_eq!(release.activated, 1);
    assert_eq!(ids(pools.active()), vec![0, 3, 1]);
    assert!(pools.bulk().is_empty());
}

#[test]
fn test_release_overflow_and_prune_active() {
    let mut pools = RidePools::new(Partition {
        bulk: vec![],
        overflow: vec![ride(0, 4, 0, 6), ride(1, 4, 5, 20)],
        dropped: None,
    });
    assert_eq!(pools.release_overflow(0).activated, 1);
    assert_eq!(ids(pools.overflow()), vec![1]);

    assert_eq!(pools.prune_active(2), 0);
    assert_eq!(pools.prune_active(3), 1);
    assert!(pools.active().is_empty());
}
