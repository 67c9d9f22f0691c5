pub mod nearest;

use dyn_clone::DynClone;

use crate::{model::ride::Ride, simulation::vehicle::Vehicle};

/// Chooses which pending ride an idle vehicle takes next.
pub trait RideSelector: DynClone {
    /// Returns the position in `pending` of the chosen ride. Implementations may reorder
    /// `pending`; the returned position refers to the order they leave behind.
    fn select(&mut self, vehicle: &Vehicle, pending: &mut [Ride]) -> Option<usize>;

    fn name(&self) -> &'static str;
}

dyn_clone::clone_trait_object!(RideSelector);
