//! Simulation state: the active/inactive portfolio partition

use crate::policy::PolicyGroup;

/// Portfolio state owned by the caller and advanced one month at a time.
///
/// A group is in exactly one of `active`/`inactive`. It moves to active
/// exactly once, in its issue month, and leaves active exactly once, at
/// maturity. Decrements reduce counts but never remove groups: near-zero
/// groups stay active indefinitely, which keeps the numerical output
/// independent of any pruning threshold.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Issued, in-force groups
    pub active: Vec<PolicyGroup>,

    /// Groups awaiting their issue month
    pub inactive: Vec<PolicyGroup>,

    /// Current month counter
    pub month: i32,
}

impl SimulationState {
    /// Partition groups at the given start month. Groups issued before the
    /// start are already in force; groups issued at or after it await
    /// admission, so a group issued in the start month is recorded as new
    /// business by the first step.
    pub fn new(groups: Vec<PolicyGroup>, start_month: i32) -> Self {
        let (active, inactive) = groups
            .into_iter()
            .partition(|group| group.policy.issue_month < start_month);

        Self { active, inactive, month: start_month }
    }

    /// State starting at the epoch
    pub fn from_groups(groups: Vec<PolicyGroup>) -> Self {
        Self::new(groups, 0)
    }

    /// Total weighted policy count currently in force
    pub fn total_in_force(&self) -> f64 {
        self.active.iter().map(|group| group.count).sum()
    }
}
