use serde::Serialize;

/// What happens to the ride sitting exactly on the boundary between the bulk and the overflow
/// pool when the length-sorted ride list is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// The boundary ride belongs to neither pool and is never scheduled. Keeps assignments
    /// identical to the established output.
    #[default]
    Drop,
    /// The boundary ride joins the overflow pool.
    Keep,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerConfig {
    /// Number of longest rides held back in the overflow pool.
    pub overflow_pool_size: usize,
    pub boundary: BoundaryPolicy,
    /// Expire rides in the active pool once they can no longer finish in time.
    pub prune_active: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            overflow_pool_size: 1000,
            boundary: BoundaryPolicy::Drop,
            prune_active: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overflow_pool_size(mut self, size: usize) -> Self {
        self.overflow_pool_size = size;
        self
    }

    pub fn boundary(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary = policy;
        self
    }

    pub fn prune_active(mut self, yes: bool) -> Self {
        self.prune_active = yes;
        self
    }
}
