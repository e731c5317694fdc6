//! Product models: parameter bundles per product family

use super::discount::DiscountCurve;
use super::investment::InvestmentPath;
use super::rates::{ConstantRate, RateProvider};
use super::table::RateTable;

/// Term-life product: level premiums, sum assured on death, no account.
pub struct TermLifeModel {
    pub mortality: Box<dyn RateProvider>,
    pub lapse: Box<dyn RateProvider>,

    /// Markup applied to the net premium in premium estimation
    pub premium_load: f64,

    /// One-off expense per policy at issue
    pub acquisition_cost: f64,

    /// Annual maintenance expense per policy, at the epoch price level
    pub annual_maintenance_cost: f64,

    /// Commission rate on premiums paid within the first 12 policy months
    pub commission_rate: f64,

    /// Annual inflation applied to the maintenance expense
    pub inflation_rate: f64,

    /// Annual spot rates by duration-in-years
    pub discount_curve: DiscountCurve,
}

impl TermLifeModel {
    /// Illustrative pricing basis: tabular select mortality, 1% constant
    /// lapse, 6% premium load.
    pub fn default_pricing() -> Self {
        Self {
            mortality: Box::new(RateTable::standard_select()),
            lapse: Box::new(ConstantRate(0.01)),
            premium_load: 0.06,
            acquisition_cost: 300.0,
            annual_maintenance_cost: 60.0,
            commission_rate: 0.05,
            inflation_rate: 0.01,
            discount_curve: DiscountCurve::flat(0.05),
        }
    }

    /// Discount factor from the given month back to the epoch
    pub fn discount_factor(&self, months: i32) -> f64 {
        self.discount_curve.factor(months)
    }

    /// Cumulative inflation factor at the given month
    pub fn inflation_factor(&self, months: i32) -> f64 {
        (1.0 + self.inflation_rate).powf(months.max(0) as f64 / 12.0)
    }

    /// Maintenance expense per policy for one month, inflated
    pub fn maintenance_cost(&self, months: i32) -> f64 {
        self.annual_maintenance_cost / 12.0 * self.inflation_factor(months)
    }
}

/// Account-based (universal-life-style) product: premiums build an account
/// that carries fees, cost-of-insurance charges, and investment crediting.
pub struct UniversalLifeModel {
    pub mortality: Box<dyn RateProvider>,
    pub lapse: Box<dyn RateProvider>,

    /// Fraction of each premium not allocated to the account
    pub premium_load: f64,

    /// Monthly fee as a fraction of the account value
    pub maintenance_fee_rate: f64,

    /// Monthly cost-of-insurance rate on the amount at risk
    pub insurance_cost_rate: f64,

    /// Commission rate on premiums paid
    pub commission_rate: f64,

    /// Per-month net investment returns, indexed by absolute month
    pub investment_returns: InvestmentPath,

    /// One-off expense per policy at issue
    pub acquisition_cost: f64,

    /// Annual inflation applied to the maintenance expense
    pub inflation_rate: f64,

    /// Annual maintenance expense per policy, at the epoch price level
    pub annual_maintenance_cost: f64,

    /// Flat annual discount rate
    pub discount_rate: f64,
}

impl UniversalLifeModel {
    /// Illustrative pricing basis over `n_months` with a seeded log-normal
    /// return path.
    pub fn default_pricing(n_months: usize, seed: u64) -> Self {
        Self {
            mortality: Box::new(RateTable::standard_select()),
            lapse: Box::new(ConstantRate(0.02)),
            premium_load: 0.05,
            maintenance_fee_rate: 0.001,
            insurance_cost_rate: 0.0001,
            commission_rate: 0.03,
            investment_returns: InvestmentPath::lognormal(n_months, 0.004, 0.02, seed),
            acquisition_cost: 5000.0,
            inflation_rate: 0.01,
            annual_maintenance_cost: 500.0,
            discount_rate: 0.02,
        }
    }

    /// Discount factor from the given month back to the epoch
    pub fn discount_factor(&self, months: i32) -> f64 {
        (1.0 + self.discount_rate).powf(-(months.max(0) as f64) / 12.0)
    }

    /// Cumulative inflation factor at the given month
    pub fn inflation_factor(&self, months: i32) -> f64 {
        (1.0 + self.inflation_rate).powf(months.max(0) as f64 / 12.0)
    }

    /// Maintenance expense per policy for one month, inflated
    pub fn maintenance_cost(&self, months: i32) -> f64 {
        self.annual_maintenance_cost / 12.0 * self.inflation_factor(months)
    }
}

/// The configured product family for a simulation run
pub enum ProductModel {
    Term(TermLifeModel),
    Universal(UniversalLifeModel),
}

impl ProductModel {
    pub fn mortality(&self) -> &dyn RateProvider {
        match self {
            ProductModel::Term(m) => m.mortality.as_ref(),
            ProductModel::Universal(m) => m.mortality.as_ref(),
        }
    }

    pub fn lapse(&self) -> &dyn RateProvider {
        match self {
            ProductModel::Term(m) => m.lapse.as_ref(),
            ProductModel::Universal(m) => m.lapse.as_ref(),
        }
    }

    pub fn acquisition_cost(&self) -> f64 {
        match self {
            ProductModel::Term(m) => m.acquisition_cost,
            ProductModel::Universal(m) => m.acquisition_cost,
        }
    }

    pub fn discount_factor(&self, months: i32) -> f64 {
        match self {
            ProductModel::Term(m) => m.discount_factor(months),
            ProductModel::Universal(m) => m.discount_factor(months),
        }
    }

    pub fn is_account_based(&self) -> bool {
        matches!(self, ProductModel::Universal(_))
    }
}
