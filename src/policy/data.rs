//! Policy and policy-group value types

use serde::{Deserialize, Serialize};

/// Term value used in model-point files to mark whole-of-life contracts.
pub const WHOLE_LIFE_TERM: u32 = 999;

/// Sex of the policyholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// Premium payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PremiumMode {
    /// Level premium, collected every month the contract is in force
    Level,
    /// Single premium, collected once in the issue month
    Single,
}

/// Product-type-specific contract terms embedded in the policy template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub premium_mode: PremiumMode,
}

impl ProductDescriptor {
    pub fn level() -> Self {
        Self { premium_mode: PremiumMode::Level }
    }

    pub fn single() -> Self {
        Self { premium_mode: PremiumMode::Single }
    }
}

/// A contract template.
///
/// Policies are immutable value types: the simulation never updates a policy
/// in place. Account-value changes produce a replacement policy via
/// [`Policy::with_account_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Sex of the policyholder
    pub sex: Sex,

    /// Age at issue, in whole years
    pub issue_age: u32,

    /// Issue month relative to the simulation epoch.
    /// Negative for business already in force at month 0.
    pub issue_month: i32,

    /// Contract term in years; `None` for whole-of-life (never expires)
    pub term_years: Option<u32>,

    /// Sum assured payable on death
    pub assured: f64,

    /// Premium per policy per month (for `Single` mode, the one-off premium)
    pub premium: f64,

    /// Current account balance (account-based products only; 0 otherwise)
    pub account_value: f64,

    /// Product-type-specific terms
    pub product: ProductDescriptor,
}

impl Policy {
    /// Create a term-life policy template with level premiums
    pub fn term(
        sex: Sex,
        issue_age: u32,
        issue_month: i32,
        term_years: u32,
        assured: f64,
        premium: f64,
    ) -> Self {
        Self {
            sex,
            issue_age,
            issue_month,
            term_years: Some(term_years),
            assured,
            premium,
            account_value: 0.0,
            product: ProductDescriptor::level(),
        }
    }

    /// Create an account-based policy template
    pub fn account_based(
        sex: Sex,
        issue_age: u32,
        issue_month: i32,
        term_years: Option<u32>,
        assured: f64,
        premium: f64,
        premium_mode: PremiumMode,
    ) -> Self {
        Self {
            sex,
            issue_age,
            issue_month,
            term_years,
            assured,
            premium,
            account_value: 0.0,
            product: ProductDescriptor { premium_mode },
        }
    }

    /// Month at which the contract matures, if it has a finite term
    pub fn expiry_month(&self) -> Option<i32> {
        self.term_years.map(|t| self.issue_month + 12 * t as i32)
    }

    /// Months elapsed since issue at the given simulation month.
    /// Negative before issue.
    pub fn duration_months(&self, month: i32) -> i32 {
        month - self.issue_month
    }

    /// Whole years elapsed since issue at the given simulation month
    pub fn duration_years(&self, month: i32) -> i32 {
        self.duration_months(month).div_euclid(12)
    }

    /// Attained age at the given simulation month
    pub fn attained_age(&self, month: i32) -> i32 {
        self.issue_age as i32 + self.duration_years(month)
    }

    /// Premium due in the given simulation month, per policy
    pub fn premium_due(&self, month: i32) -> f64 {
        match self.product.premium_mode {
            PremiumMode::Level => self.premium,
            PremiumMode::Single => {
                if month == self.issue_month {
                    self.premium
                } else {
                    0.0
                }
            }
        }
    }

    /// Replacement policy with an updated account balance
    pub fn with_account_value(&self, account_value: f64) -> Self {
        Self { account_value, ..self.clone() }
    }

    /// Replacement policy with an updated premium
    pub fn with_premium(&self, premium: f64) -> Self {
        Self { premium, ..self.clone() }
    }
}

/// A weighted count of identical contracts.
///
/// The count is a non-negative real number; decrements leave it fractional.
/// Groups are replaced, never mutated: a decremented group is a new value
/// with the same policy and a smaller count, so snapshots held by event
/// records stay untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyGroup {
    pub policy: Policy,
    pub count: f64,
}

impl PolicyGroup {
    pub fn new(policy: Policy, count: f64) -> Self {
        Self { policy, count }
    }

    /// Replacement group with the same policy and a new count
    pub fn with_count(&self, count: f64) -> Self {
        Self { policy: self.policy.clone(), count }
    }

    /// Replacement group with a new policy and the same count
    pub fn with_policy(&self, policy: Policy) -> Self {
        Self { policy, count: self.count }
    }
}
