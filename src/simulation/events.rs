//! Structured output of one simulation step

use crate::policy::PolicyGroup;
use serde::{Deserialize, Serialize};

/// One month's account roll-forward for a single group, per policy.
///
/// Dollar amounts are per policy; multiply by the owning group's count for
/// group-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountChanges {
    /// Premium collected
    pub premium_paid: f64,

    /// Premium net of load allocated to the account
    pub premium_into_account: f64,

    /// Maintenance fee rate applied to the account value
    pub fee_rate: f64,

    /// Cost-of-insurance charge deducted
    pub insurance_cost: f64,

    /// Investment return credited
    pub investment_credit: f64,

    /// Net change in account value over the month
    pub net_change: f64,
}

/// Event record for one month of simulation.
///
/// Allocated once per run and mutated in place each step; the caller clears
/// it between steps (there is no implicit reset). Death and lapse lists only
/// record non-zero occurrences. Groups stored here are pre-decrement
/// snapshots, distinct from the live entries in the active set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// The month this record describes
    pub month: i32,

    /// (pre-decrement group, lapsed count) pairs
    pub lapses: Vec<(PolicyGroup, f64)>,

    /// (pre-decrement group, death count) pairs
    pub deaths: Vec<(PolicyGroup, f64)>,

    /// Groups that matured this month
    pub expirations: Vec<PolicyGroup>,

    /// Groups admitted as new business this month
    pub starts: Vec<PolicyGroup>,

    /// Account roll-forward per group (account-based products only)
    pub account_changes: Vec<(PolicyGroup, AccountChanges)>,

    /// Total claims incurred this month
    pub claimed: f64,

    /// Total expenses incurred this month
    pub expenses: f64,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for the next step, keeping allocations
    pub fn clear(&mut self) {
        self.month = 0;
        self.lapses.clear();
        self.deaths.clear();
        self.expirations.clear();
        self.starts.clear();
        self.account_changes.clear();
        self.claimed = 0.0;
        self.expenses = 0.0;
    }

    /// Total deaths across all groups this month
    pub fn total_deaths(&self) -> f64 {
        self.deaths.iter().map(|(_, n)| n).sum()
    }

    /// Total lapses across all groups this month
    pub fn total_lapses(&self) -> f64 {
        self.lapses.iter().map(|(_, n)| n).sum()
    }

    /// Total count admitted as new business this month
    pub fn total_starts(&self) -> f64 {
        self.starts.iter().map(|group| group.count).sum()
    }
}
