use serde::Serialize;

use crate::model::{instance::Instance, point::Point};

use super::Assignment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub total: i64,
    pub on_time: usize,
    pub bonus_rides: usize,
    pub late: usize,
}

/// Replays every route from the origin at step 0. Vehicles wait at the pickup until the
/// ride's earliest start. A ride finishing by its latest finish and by the end of the horizon
/// earns its length, plus the instance bonus if it also started at its earliest start.
///
/// Rides the instance does not know are skipped.
pub fn score(instance: &Instance, assignment: &Assignment) -> Score {
    let header = &instance.header;
    let mut score = Score::default();

    for route in assignment.routes() {
        let mut clock = 0;
        let mut position = Point::ORIGIN;
        for id in route {
            let Some(ride) = instance.rides.get(id.0) else {
                continue;
            };
            let start = (clock + position.distance(ride.origin)).max(ride.earliest_start);
            let finish = start + ride.length();
            if finish <= ride.latest_finish && finish <= header.max_steps {
                score.total += ride.length();
                score.on_time += 1;
                if start == ride.earliest_start {
                    score.total += header.bonus;
                    score.bonus_rides += 1;
                }
            } else {
                score.late += 1;
            }
            clock = finish;
            position = ride.destination;
        }
    }

    score
}

#[test]
fn test_score_on_time_ride_with_bonus() {
    use crate::model::ride::RideId;

    let instance: Instance = "2 2 1 1 1 2\n0 0 1 1 0 2\n".parse().unwrap();
    let assignment = Assignment::new(vec![vec![RideId(0)]]);
    assert_eq!(
        score(&instance, &assignment),
        Score {
            total: 3,
            on_time: 1,
            bonus_rides: 1,
            late: 0
        }
    );
}

#[test]
fn test_score_waits_and_misses() {
    use crate::model::ride::RideId;

    // ride 0: reach (0,2) at 2, wait until 4, finish at 6 -> bonus
    // ride 1: reach (3,4) at 9, finish at 10 > latest finish 9
    // ride 2: already at (3,3) at 10, start 10 > earliest 8, finish 11 -> no bonus
    let instance: Instance = "10 10 1 3 5 20\n0 2 0 4 4 8\n3 4 3 3 0 9\n3 3 4 3 8 12\n"
        .parse()
        .unwrap();
    let assignment = Assignment::new(vec![vec![RideId(0), RideId(1), RideId(2)]]);
    let s = score(&instance, &assignment);
    assert_eq!(s.on_time, 2);
    assert_eq!(s.late, 1);
    assert_eq!(s.bonus_rides, 1);
    assert_eq!(s.total, 2 + 5 + 1);
}

#[test]
fn test_score_respects_horizon() {
    use crate::model::ride::RideId;

    let instance: Instance = "5 5 1 1 0 3\n0 0 4 0 0 10\n".parse().unwrap();
    let s = score(&instance, &Assignment::new(vec![vec![RideId(0)]]));
    assert_eq!(s.total, 0);
    assert_eq!(s.late, 1);
}
