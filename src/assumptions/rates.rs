//! Mortality and lapse rate providers
//!
//! Providers are polymorphic over a capability: the population-level slot
//! (`annual_rate`) is mandatory, the per-group slot (`annual_rate_for`)
//! defaults to broadcasting the population rate. The `per_policy` flag tells
//! the stepping engine whether rates must be recomputed inside the per-group
//! loop; providers default to population-level, which the engine evaluates
//! once per step.

use crate::policy::Policy;

/// Convert an annual decrement rate to monthly under a uniform decrement
/// assumption: `1 - (1 - annual)^(1/12)`.
pub fn monthly_from_annual(annual: f64) -> f64 {
    1.0 - (1.0 - annual).powf(1.0 / 12.0)
}

/// A source of annual decrement rates (mortality or lapse).
pub trait RateProvider: Send + Sync {
    /// Population-level annual rate at the given simulation month.
    fn annual_rate(&self, month: i32) -> f64;

    /// Per-group annual rate. Defaults to broadcasting the population rate.
    fn annual_rate_for(&self, month: i32, _policy: &Policy) -> f64 {
        self.annual_rate(month)
    }

    /// Whether rates vary per policy group. When false the engine computes a
    /// single rate per step instead of one per group.
    fn per_policy(&self) -> bool {
        false
    }

    /// Population-level monthly rate at the given simulation month.
    fn monthly_rate(&self, month: i32) -> f64 {
        monthly_from_annual(self.annual_rate(month))
    }

    /// Per-group monthly rate.
    fn monthly_rate_for(&self, month: i32, policy: &Policy) -> f64 {
        monthly_from_annual(self.annual_rate_for(month, policy))
    }
}

/// Time- and age-invariant rate
#[derive(Debug, Clone, Copy)]
pub struct ConstantRate(pub f64);

impl RateProvider for ConstantRate {
    fn annual_rate(&self, _month: i32) -> f64 {
        self.0
    }
}

/// Rate that varies with simulation time only
pub struct TimeVaryingRate {
    f: Box<dyn Fn(i32) -> f64 + Send + Sync>,
}

impl TimeVaryingRate {
    pub fn new(f: impl Fn(i32) -> f64 + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl RateProvider for TimeVaryingRate {
    fn annual_rate(&self, month: i32) -> f64 {
        (self.f)(month)
    }
}

/// Rate computed from time and policy attributes. The most general provider;
/// always per-group.
pub struct PolicyVaryingRate {
    f: Box<dyn Fn(i32, &Policy) -> f64 + Send + Sync>,
}

impl PolicyVaryingRate {
    pub fn new(f: impl Fn(i32, &Policy) -> f64 + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl RateProvider for PolicyVaryingRate {
    /// Policy-dependent providers have no meaningful population rate; the
    /// engine must branch on [`RateProvider::per_policy`] before calling this.
    fn annual_rate(&self, _month: i32) -> f64 {
        panic!("policy-dependent rate provider has no population-level rate; call annual_rate_for")
    }

    fn annual_rate_for(&self, month: i32, policy: &Policy) -> f64 {
        (self.f)(month, policy)
    }

    fn per_policy(&self) -> bool {
        true
    }
}
