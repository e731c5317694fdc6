//! Cashflow statements derived from event records

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::engine::Simulation;
use super::events::EventRecord;
use crate::assumptions::{ProductModel, TermLifeModel};
use crate::policy::PolicyGroup;

/// One period's cashflow statement.
///
/// Cashflows compose by exact pointwise addition across every field, so an
/// n-period aggregate is the plain sum of the period statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub premiums: f64,
    pub investments: f64,
    pub claims: f64,
    pub expenses: f64,
    pub commissions: f64,
    pub account_value_changes: f64,
    /// premiums + investments - claims - expenses - commissions
    /// - account_value_changes
    pub net: f64,
    /// net scaled by the model's discount factor for the period
    pub discounted: f64,
}

impl CashFlow {
    /// Cashflow components captured in an event record: claims and expenses,
    /// plus premium/investment/account movements for account-based products.
    pub fn from_events(events: &EventRecord, model: &ProductModel) -> Self {
        let mut flow = CashFlow {
            claims: events.claimed,
            expenses: events.expenses,
            ..CashFlow::default()
        };

        if let ProductModel::Universal(universal) = model {
            for (group, changes) in &events.account_changes {
                flow.premiums += changes.premium_paid * group.count;
                flow.investments += changes.investment_credit * group.count;
                flow.account_value_changes += changes.net_change * group.count;
            }
            flow.commissions = flow.premiums * universal.commission_rate;
        }

        flow
    }

    /// Cashflow components accrued by the in-force portfolio itself: term
    /// premiums, maintenance expenses, and first-year commission. Account
    /// products capture these through the roll-forward instead.
    pub fn from_active(active: &[PolicyGroup], model: &TermLifeModel, month: i32) -> Self {
        let mut flow = CashFlow::default();
        let maintenance = model.maintenance_cost(month);

        for group in active {
            let premiums = group.policy.premium_due(month) * group.count;
            flow.premiums += premiums;
            flow.expenses += maintenance * group.count;
            if group.policy.duration_months(month) < 12 {
                flow.commissions += premiums * model.commission_rate;
            }
        }

        flow
    }

    fn finalize(mut self, model: &ProductModel, month: i32) -> Self {
        self.net = self.premiums + self.investments
            - self.claims
            - self.expenses
            - self.commissions
            - self.account_value_changes;
        self.discounted = self.net * model.discount_factor(month);
        self
    }
}

impl Add for CashFlow {
    type Output = CashFlow;

    fn add(self, other: CashFlow) -> CashFlow {
        CashFlow {
            premiums: self.premiums + other.premiums,
            investments: self.investments + other.investments,
            claims: self.claims + other.claims,
            expenses: self.expenses + other.expenses,
            commissions: self.commissions + other.commissions,
            account_value_changes: self.account_value_changes + other.account_value_changes,
            net: self.net + other.net,
            discounted: self.discounted + other.discounted,
        }
    }
}

impl AddAssign for CashFlow {
    fn add_assign(&mut self, other: CashFlow) {
        *self = *self + other;
    }
}

impl Sum for CashFlow {
    fn sum<I: Iterator<Item = CashFlow>>(iter: I) -> CashFlow {
        iter.fold(CashFlow::default(), Add::add)
    }
}

/// Full cashflow for the period an event record describes: events plus, for
/// term products, the in-force accrual. Account-based cashflows come
/// entirely from the record since premiums already sit in account changes.
pub fn period_cashflow(
    model: &ProductModel,
    events: &EventRecord,
    active: &[PolicyGroup],
) -> CashFlow {
    let mut flow = CashFlow::from_events(events, model);
    if let ProductModel::Term(term) = model {
        flow += CashFlow::from_active(active, term, events.month);
    }
    flow.finalize(model, events.month)
}

/// Drive a full simulation and derive one cashflow per period.
pub fn run_cashflows(sim: &Simulation, groups: Vec<PolicyGroup>, n_steps: u32) -> Vec<CashFlow> {
    let mut flows = Vec::with_capacity(n_steps as usize);
    sim.run(groups, n_steps, |state, events| {
        flows.push(period_cashflow(sim.model(), events, &state.active));
    });
    flows
}
