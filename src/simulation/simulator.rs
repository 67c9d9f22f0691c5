use tracing::{debug, info, trace, warn};

use crate::{
    config::SchedulerConfig,
    model::instance::{Instance, InstanceHeader},
    output::Assignment,
    schedule::{nearest::NearestRideSelector, RideSelector},
};

use super::{
    callback::{SimulationCallback, StepReport},
    pool::{partition, Release, RidePools},
    vehicle::{Vehicle, VehicleId},
};

/// Greedy step simulation: owns the fleet and every ride pool.
#[derive(Clone)]
pub struct Simulator {
    header: InstanceHeader,
    config: SchedulerConfig,
    step: i64,
    total_rides: usize,

    vehicles: Vec<Vehicle>,
    pools: RidePools,

    selector: Box<dyn RideSelector>,
    callbacks: Vec<Box<dyn SimulationCallback>>,
}

impl Simulator {
    pub fn new(instance: Instance, config: SchedulerConfig) -> Self {
        Self::with_selector(instance, config, Box::new(NearestRideSelector))
    }

    pub fn with_selector(
        instance: Instance,
        config: SchedulerConfig,
        selector: Box<dyn RideSelector>,
    ) -> Self {
        let Instance { header, rides } = instance;
        let total_rides = rides.len();

        let partition = partition(rides, config.overflow_pool_size, config.boundary);
        if let Some(ride) = &partition.dropped {
            warn!(
                ride = %ride.id,
                length = ride.length(),
                "boundary ride is left out of both pools and will not be scheduled"
            );
        }
        info!(
            vehicles = header.vehicles,
            bulk = partition.bulk.len(),
            overflow = partition.overflow.len(),
            selector = selector.name(),
            "rides partitioned"
        );

        Self {
            vehicles: (0..header.vehicles).map(|i| Vehicle::new(VehicleId(i))).collect(),
            pools: RidePools::new(partition),
            header,
            config,
            step: 0,
            total_rides,
            selector,
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Box<dyn SimulationCallback>) {
        self.callbacks.push(callback);
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn pools(&self) -> &RidePools {
        &self.pools
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.header.max_steps
    }

    /// Runs every remaining step of the horizon and returns the final assignment.
    pub fn run(&mut self) -> anyhow::Result<Assignment> {
        self.simulate_until(self.header.max_steps);
        let assignment = self.assignment();
        for cb in self.callbacks.iter_mut() {
            cb.visit_finish(&assignment)?;
        }
        info!(
            assigned = assignment.assigned_rides(),
            total = self.total_rides,
            unreleased = self.pools.waiting(),
            pending = self.pools.active().len(),
            "simulation finished"
        );
        Ok(assignment)
    }

    pub fn assignment(&self) -> Assignment {
        Assignment::from_vehicles(&self.vehicles)
    }

    /// Simulates steps while the clock is before `until`, never past the horizon.
    pub fn simulate_until(&mut self, until: i64) {
        while self.step < until && !self.is_finished() {
            self.simulate_step();
        }
    }

    pub fn simulate_step(&mut self) -> Option<StepReport> {
        if self.is_finished() {
            return None;
        }
        let step = self.step;

        let bulk = self.pools.release_bulk(step);
        let overflow = self.release_overflow(step);
        let pruned = if self.config.prune_active {
            self.pools.prune_active(step)
        } else {
            0
        };
        let assigned = self.dispatch(step);

        let report = StepReport {
            step,
            bulk,
            overflow,
            pruned,
            assigned,
            pending: self.pools.active().len(),
        };
        trace!(?report, "step simulated");
        self.callbacks
            .iter_mut()
            .for_each(|cb| cb.visit_step(&report));

        self.step += 1;
        Some(report)
    }

    // the long rides are only consulted while the active pool cannot keep the fleet busy
    fn release_overflow(&mut self, step: i64) -> Option<Release> {
        if self.pools.active().len() < self.vehicles.len() {
            let release = self.pools.release_overflow(step);
            if release.activated > 0 {
                debug!(step, activated = release.activated, "overflow rides released");
            }
            Some(release)
        } else {
            None
        }
    }

    // vehicles go in fleet order, each one sees the pool left by the previous ones
    fn dispatch(&mut self, step: i64) -> usize {
        let mut assigned = 0;
        for vehicle in self.vehicles.iter_mut() {
            if vehicle.is_available() && !self.pools.active().is_empty() {
                let pending = self.pools.active_mut();
                if let Some(i) = self.selector.select(vehicle, pending) {
                    let ride = pending.remove(i);
                    let remaining = pending.len();
                    self.callbacks
                        .iter_mut()
                        .for_each(|cb| cb.visit_assignment(vehicle.id(), &ride, step, remaining));
                    vehicle.commit(ride);
                    assigned += 1;
                }
            }
            vehicle.tick();
        }
        assigned
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashSet, rc::Rc};

    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;
    use crate::{
        config::BoundaryPolicy,
        model::ride::{Ride, RideId},
        output::validate_reader,
    };

    #[derive(Debug, Default)]
    struct Recorded {
        assignments: Vec<(VehicleId, Ride, i64)>,
        steps: Vec<StepReport>,
    }

    #[derive(Clone, Default)]
    struct RecordingCallback(Rc<RefCell<Recorded>>);

    impl SimulationCallback for RecordingCallback {
        fn visit_assignment(&mut self, vehicle: VehicleId, ride: &Ride, step: i64, _: usize) {
            self.0
                .borrow_mut()
                .assignments
                .push((vehicle, ride.clone(), step));
        }

        fn visit_step(&mut self, report: &StepReport) {
            self.0.borrow_mut().steps.push(report.clone());
        }
    }

    fn run(input: &str, config: SchedulerConfig) -> String {
        let instance: Instance = input.parse().unwrap();
        Simulator::new(instance, config).run().unwrap().to_string()
    }

    fn random_instance(rng: &mut SmallRng) -> String {
        let vehicles = rng.random_range(1..6);
        let rides = rng.random_range(0..80);
        let max_steps = rng.random_range(10..80);
        let mut input = format!("20 20 {vehicles} {rides} 3 {max_steps}\n");
        for _ in 0..rides {
            let start = rng.random_range(0..max_steps);
            let finish = start + rng.random_range(0..40);
            input.push_str(&format!(
                "{} {} {} {} {start} {finish}\n",
                rng.random_range(0..20),
                rng.random_range(0..20),
                rng.random_range(0..20),
                rng.random_range(0..20),
            ));
        }
        input
    }

    #[test]
    fn test_single_ride_is_served() {
        let output = run("2 2 1 0 1 2\n0 0 1 1 0 2\n", SchedulerConfig::default());
        assert_eq!(output, "1 0\n");
    }

    #[test]
    fn test_ride_that_can_never_finish_is_dropped() {
        let output = run("2 2 1 0 1 2\n0 0 1 1 0 0\n", SchedulerConfig::default());
        assert_eq!(output, "0\n");
    }

    #[test]
    fn test_empty_instance_leaves_fleet_idle() {
        let instance: Instance = "5 5 3 0 1 10\n".parse().unwrap();
        let mut sim = Simulator::new(instance, SchedulerConfig::default());
        let output = sim.run().unwrap().to_string();
        assert_eq!(output, "0\n0\n0\n");
        assert!(sim.is_finished());
        assert_eq!(sim.step(), 10);
        assert!(sim.vehicles().iter().all(Vehicle::is_available));
    }

    #[test]
    fn test_busy_vehicle_is_skipped_until_free() {
        // ride 0 keeps vehicle 0 busy through step 2, ride 1 goes to vehicle 1 at step 1 and
        // ride 2 waits until step 3, when vehicle 0 is free again and comes first
        let input = "10 10 2 3 0 20\n0 0 1 1 0 20\n0 0 0 1 1 20\n1 1 1 5 1 20\n";
        let instance: Instance = input.parse().unwrap();
        let recorded = RecordingCallback::default();
        let mut sim = Simulator::new(instance, SchedulerConfig::default());
        sim.add_callback(Box::new(recorded.clone()));
        let output = sim.run().unwrap().to_string();

        let log = recorded.0.borrow();
        let steps: Vec<_> = log
            .assignments
            .iter()
            .map(|(v, r, s)| (v.0, r.id.0, *s))
            .collect();
        assert_eq!(steps, vec![(0, 0, 0), (1, 1, 1), (0, 2, 3)]);
        assert_eq!(output, "2 0 2\n1 1\n");
    }

    #[test]
    fn test_earlier_vehicles_claim_rides_first() {
        let input = "10 10 2 2 0 5\n3 3 3 4 0 20\n4 4 4 5 0 20\n";
        let output = run(input, SchedulerConfig::default());
        // both vehicles start at the origin, vehicle 0 takes the nearest ride
        assert_eq!(output, "1 0\n1 1\n");
    }

    #[test]
    fn test_overflow_only_opens_when_demand_is_low() {
        // two short rides fill the single vehicle's demand at step 0, the long one waits
        let input = "10 10 1 3 0 3\n0 0 0 1 0 50\n0 0 1 0 0 50\n0 0 5 5 0 50\n";
        let instance: Instance = input.parse().unwrap();
        let config = SchedulerConfig::default()
            .overflow_pool_size(1)
            .boundary(BoundaryPolicy::Keep);
        let recorded = RecordingCallback::default();
        let mut sim = Simulator::new(instance, config);
        sim.add_callback(Box::new(recorded.clone()));
        sim.run().unwrap();

        let log = recorded.0.borrow();
        assert_eq!(log.steps[0].bulk.activated, 2);
        assert_eq!(log.steps[0].overflow, None);
        // one short ride is left pending at step 1, still enough for one vehicle
        assert_eq!(log.steps[1].overflow, None);
        assert_eq!(sim.pools().overflow().len(), 1);
    }

    #[test]
    fn test_late_ride_counts_toward_demand_before_it_is_pruned() {
        // ride 0 is due at step 0 but can never finish, ride 1 is the long overflow ride
        let input = "10 10 1 2 0 10\n0 0 0 1 0 0\n0 0 3 3 0 50\n";
        let instance: Instance = input.parse().unwrap();
        let config = SchedulerConfig::default()
            .overflow_pool_size(1)
            .boundary(BoundaryPolicy::Keep);
        let recorded = RecordingCallback::default();
        let mut sim = Simulator::new(instance, config);
        sim.add_callback(Box::new(recorded.clone()));
        let output = sim.run().unwrap().to_string();

        let log = recorded.0.borrow();
        assert_eq!(log.steps[0].bulk.activated, 1);
        assert_eq!(log.steps[0].overflow, None);
        assert_eq!(log.steps[0].pruned, 1);
        assert_eq!(log.steps[1].overflow.map(|r| r.activated), Some(1));
        assert_eq!(output, "1 1\n");
    }

    #[test]
    fn test_legacy_mode_keeps_stale_active_rides() {
        // vehicle 0 is busy with ride 0 until step 8, ride 1 can only start up to step 4
        let input = "10 10 1 2 0 20\n0 0 4 4 0 20\n1 0 1 1 0 5\n";
        let pruned = run(input, SchedulerConfig::default().overflow_pool_size(0));
        assert_eq!(pruned, "1 0\n");
        let legacy = run(
            input,
            SchedulerConfig::default()
                .overflow_pool_size(0)
                .prune_active(false),
        );
        assert_eq!(legacy, "2 0 1\n");
    }

    #[test]
    fn test_simulate_until_stops_at_horizon() {
        let instance: Instance = "2 2 1 0 1 4\n".parse().unwrap();
        let mut sim = Simulator::new(instance, SchedulerConfig::default());
        sim.simulate_until(2);
        assert_eq!(sim.step(), 2);
        sim.simulate_until(100);
        assert_eq!(sim.step(), 4);
        assert!(sim.simulate_step().is_none());
    }

    #[test]
    fn test_clone_replays_identically() {
        let mut rng = SmallRng::seed_from_u64(727);
        for _ in 0..20 {
            let instance: Instance = random_instance(&mut rng).parse().unwrap();
            let config = SchedulerConfig::default().overflow_pool_size(7);
            let mut sim = Simulator::new(instance, config);
            let mut fork = sim.clone();
            assert_eq!(sim.run().unwrap().to_string(), fork.run().unwrap().to_string());
        }
    }

    #[test]
    fn test_random_instances_hold_assignment_invariants() {
        let mut rng = SmallRng::seed_from_u64(727);
        for _ in 0..200 {
            let input = random_instance(&mut rng);
            let instance: Instance = input.parse().unwrap();
            let fleet = instance.header.vehicles;
            let boundary = if rng.random_bool(0.5) {
                BoundaryPolicy::Drop
            } else {
                BoundaryPolicy::Keep
            };
            let config = SchedulerConfig::default()
                .overflow_pool_size(rng.random_range(0..20))
                .boundary(boundary);

            let recorded = RecordingCallback::default();
            let mut sim = Simulator::new(instance.clone(), config);
            sim.add_callback(Box::new(recorded.clone()));
            let output = sim.run().unwrap().to_string();

            let summary = validate_reader(output.as_bytes()).unwrap();
            summary.check_against(&instance).unwrap();
            assert_eq!(summary.vehicles(), fleet);

            let log = recorded.0.borrow();
            let mut seen = HashSet::new();
            for (_, ride, step) in &log.assignments {
                assert!(ride.on_time(*step), "ride {:?} assigned late at {step}", ride.id);
                assert!(ride.earliest_start <= *step);
                assert!(seen.insert(ride.id));
            }
            assert_eq!(seen.len(), summary.assigned_rides());
            assert!(seen.iter().all(|id: &RideId| id.0 < instance.rides.len()));

            for report in &log.steps {
                if report.overflow.is_none() {
                    assert!(report.pending + report.assigned + report.pruned >= fleet);
                }
            }
        }
    }
}
