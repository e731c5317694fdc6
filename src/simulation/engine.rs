//! Monthly stepping engine for policy-group portfolios
//!
//! Each step applies, in order: expiration, new-business admission, account
//! roll-forward (account-based products), and mid-month decrements, then
//! advances the month counter. The order is load-bearing: decrements act on
//! counts and account values produced by the earlier stages of the same
//! month.

use log::debug;

use super::events::{AccountChanges, EventRecord};
use super::state::SimulationState;
use crate::assumptions::{ProductModel, UniversalLifeModel};
use crate::policy::PolicyGroup;

/// The simulation state machine for one product model.
pub struct Simulation {
    model: ProductModel,
}

impl Simulation {
    pub fn new(model: ProductModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ProductModel {
        &self.model
    }

    /// Perform exactly one month's transition.
    ///
    /// Fills `events` with this month's occurrences; the record must have
    /// been cleared by the caller, entries are appended. Advances
    /// `state.month` by one at the end.
    pub fn advance_one_step(&self, state: &mut SimulationState, events: &mut EventRecord) {
        events.month = state.month;

        self.remove_expirations(state, events);
        self.admit_new_business(state, events);
        if let ProductModel::Universal(model) = &self.model {
            roll_accounts(model, state, events);
        }
        self.apply_decrements(state, events);

        state.month += 1;
    }

    /// Build the initial state and step `n_steps` times, invoking the
    /// callback after each step with the just-produced event record. The
    /// record is reused and cleared between steps; callbacks that need to
    /// keep events must copy them out.
    pub fn run<F>(&self, groups: Vec<PolicyGroup>, n_steps: u32, mut on_step: F) -> SimulationState
    where
        F: FnMut(&SimulationState, &EventRecord),
    {
        let mut state = SimulationState::from_groups(groups);
        debug!(
            "starting run: {} active groups, {} awaiting issue, {} steps",
            state.active.len(),
            state.inactive.len(),
            n_steps
        );

        let mut events = EventRecord::new();
        for _ in 0..n_steps {
            events.clear();
            self.advance_one_step(&mut state, &mut events);
            on_step(&state, &events);
        }

        state
    }

    /// Stage 1: remove groups maturing this month from the active set.
    fn remove_expirations(&self, state: &mut SimulationState, events: &mut EventRecord) {
        let month = state.month;
        let mut i = 0;
        while i < state.active.len() {
            if state.active[i].policy.expiry_month() == Some(month) {
                let group = state.active.remove(i);
                events.claimed += self.expiry_claim(&group);
                events.expirations.push(group);
            } else {
                i += 1;
            }
        }
    }

    /// Stage 2: move groups issued this month from inactive to active.
    fn admit_new_business(&self, state: &mut SimulationState, events: &mut EventRecord) {
        let month = state.month;
        let mut i = 0;
        while i < state.inactive.len() {
            if state.inactive[i].policy.issue_month == month {
                let group = state.inactive.remove(i);
                events.expenses += self.model.acquisition_cost() * group.count;
                events.starts.push(group.clone());
                state.active.push(group);
            } else {
                i += 1;
            }
        }
    }

    /// Stage 4: deaths first, then lapses on the survivors.
    fn apply_decrements(&self, state: &mut SimulationState, events: &mut EventRecord) {
        let month = state.month;
        let mortality = self.model.mortality();
        let lapse = self.model.lapse();

        // Capability branch happens here, once per step: population-level
        // providers are evaluated a single time outside the group loop.
        let population_death_rate = (!mortality.per_policy()).then(|| mortality.monthly_rate(month));
        let population_lapse_rate = (!lapse.per_policy()).then(|| lapse.monthly_rate(month));

        for idx in 0..state.active.len() {
            let group = state.active[idx].clone();

            let death_rate = population_death_rate
                .unwrap_or_else(|| mortality.monthly_rate_for(month, &group.policy));
            let lapse_rate = population_lapse_rate
                .unwrap_or_else(|| lapse.monthly_rate_for(month, &group.policy));

            let deaths = group.count * death_rate;
            let lapses = (group.count - deaths) * lapse_rate;

            if deaths != 0.0 {
                events.deaths.push((group.clone(), deaths));
            }
            if lapses != 0.0 {
                events.lapses.push((group.clone(), lapses));
            }
            events.claimed += self.decrement_claim(&group, deaths, lapses, month);

            state.active[idx] = group.with_count(group.count - deaths - lapses);
        }
    }

    /// Claim paid when a group matures.
    fn expiry_claim(&self, group: &PolicyGroup) -> f64 {
        match &self.model {
            // Pure expiry pays nothing on a term contract
            ProductModel::Term(_) => 0.0,
            // Account-based maturity pays out the account, floored at the
            // sum assured
            ProductModel::Universal(_) => {
                group.count * group.policy.account_value.max(group.policy.assured)
            }
        }
    }

    /// Claim generated by this month's deaths and lapses.
    fn decrement_claim(&self, group: &PolicyGroup, deaths: f64, lapses: f64, month: i32) -> f64 {
        match &self.model {
            ProductModel::Term(_) => deaths * group.policy.assured,
            ProductModel::Universal(model) => {
                // Deaths fall mid-month: unwind half the month's investment
                // credit from the rolled-forward account value.
                let growth = 1.0 + model.investment_returns.rate(month);
                let mid_month_value = group.policy.account_value / growth.sqrt();
                deaths * mid_month_value.max(group.policy.assured)
                    + lapses * group.policy.account_value
            }
        }
    }
}

/// Stage 3: account roll-forward for account-based products.
///
/// Premium (net of load) is allocated to the account, the maintenance fee
/// and cost-of-insurance charge are deducted, and the month's investment
/// return is credited. Group policies are replaced by value, so snapshots
/// already recorded this month are unaffected.
fn roll_accounts(model: &UniversalLifeModel, state: &mut SimulationState, events: &mut EventRecord) {
    let month = state.month;
    let investment_rate = model.investment_returns.rate(month);
    let maintenance = model.maintenance_cost(month);

    for idx in 0..state.active.len() {
        let group = state.active[idx].clone();
        let policy = &group.policy;

        let premium = policy.premium_due(month);
        let into_account = premium * (1.0 - model.premium_load);
        let after_premium = policy.account_value + into_account;

        let fee = after_premium * model.maintenance_fee_rate;
        let after_fee = after_premium - fee;

        let amount_at_risk = after_fee.max(policy.assured);
        let insurance_cost = amount_at_risk * model.insurance_cost_rate;
        let after_charges = after_fee - insurance_cost;

        let investment_credit = after_charges * investment_rate;
        let new_value = after_charges + investment_credit;

        let changes = AccountChanges {
            premium_paid: premium,
            premium_into_account: into_account,
            fee_rate: model.maintenance_fee_rate,
            insurance_cost,
            investment_credit,
            net_change: new_value - policy.account_value,
        };

        events.expenses += maintenance * group.count;
        events.account_changes.push((group.clone(), changes));

        state.active[idx] = group.with_policy(policy.with_account_value(new_value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{
        monthly_from_annual, ConstantRate, InvestmentPath, PolicyVaryingRate, TermLifeModel,
        UniversalLifeModel,
    };
    use crate::policy::{Policy, PremiumMode, Sex};
    use approx::assert_relative_eq;

    fn term_model(mortality: f64, lapse: f64) -> ProductModel {
        ProductModel::Term(TermLifeModel {
            mortality: Box::new(ConstantRate(mortality)),
            lapse: Box::new(ConstantRate(lapse)),
            ..TermLifeModel::default_pricing()
        })
    }

    fn universal_model(mortality: f64, lapse: f64, returns: Vec<f64>) -> UniversalLifeModel {
        UniversalLifeModel {
            mortality: Box::new(ConstantRate(mortality)),
            lapse: Box::new(ConstantRate(lapse)),
            premium_load: 0.05,
            maintenance_fee_rate: 0.001,
            insurance_cost_rate: 0.0001,
            investment_returns: InvestmentPath::new(returns),
            ..UniversalLifeModel::default_pricing(0, 0)
        }
    }

    fn term_group(issue_month: i32, term_years: u32, count: f64) -> PolicyGroup {
        PolicyGroup::new(
            Policy::term(Sex::Male, 40, issue_month, term_years, 200_000.0, 25.0),
            count,
        )
    }

    #[test]
    fn test_mortality_applies_before_lapse() {
        let sim = Simulation::new(term_model(0.12, 0.24));
        let mut state = SimulationState::from_groups(vec![term_group(-1, 20, 100.0)]);
        let mut events = EventRecord::new();

        sim.advance_one_step(&mut state, &mut events);

        let death_rate = monthly_from_annual(0.12);
        let lapse_rate = monthly_from_annual(0.24);
        let expected_deaths = 100.0 * death_rate;
        let expected_lapses = (100.0 - expected_deaths) * lapse_rate;

        assert_eq!(events.deaths.len(), 1);
        assert_eq!(events.lapses.len(), 1);
        assert_relative_eq!(events.deaths[0].1, expected_deaths);
        // Lapses act on the post-death count, not the original count
        assert_relative_eq!(events.lapses[0].1, expected_lapses);
        assert!((events.lapses[0].1 - 100.0 * lapse_rate).abs() > 1e-6);
    }

    #[test]
    fn test_decrement_conservation() {
        let sim = Simulation::new(term_model(0.05, 0.10));
        let mut state = SimulationState::from_groups(vec![term_group(-1, 20, 80.0)]);
        let mut events = EventRecord::new();

        for _ in 0..24 {
            let before = state.active[0].count;
            events.clear();
            sim.advance_one_step(&mut state, &mut events);
            let after = state.active[0].count;

            assert_relative_eq!(
                before,
                after + events.total_deaths() + events.total_lapses(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_zero_rates_leave_counts_untouched() {
        let sim = Simulation::new(term_model(0.0, 0.0));
        let mut state = SimulationState::from_groups(vec![term_group(-1, 20, 100.0)]);
        let mut events = EventRecord::new();

        for _ in 0..60 {
            events.clear();
            sim.advance_one_step(&mut state, &mut events);

            // Exactly unchanged, and the sparse lists stay empty
            assert_eq!(state.active[0].count, 100.0);
            assert!(events.deaths.is_empty());
            assert!(events.lapses.is_empty());
        }
    }

    #[test]
    fn test_event_record_snapshots_pre_decrement_counts() {
        let sim = Simulation::new(term_model(0.10, 0.0));
        let mut state = SimulationState::from_groups(vec![term_group(-1, 20, 100.0)]);
        let mut events = EventRecord::new();

        sim.advance_one_step(&mut state, &mut events);
        events.clear();
        sim.advance_one_step(&mut state, &mut events);

        // The second step's snapshot carries the first step's decremented
        // count, not the live post-decrement value.
        let snapshot = &events.deaths[0].0;
        let after_first = 100.0 - 100.0 * monthly_from_annual(0.10);
        assert_relative_eq!(snapshot.count, after_first, max_relative = 1e-12);
        assert!(snapshot.count > state.active[0].count);
    }

    #[test]
    fn test_rate_shape_equivalence() {
        // A population-level constant and a per-group provider returning the
        // same constant must produce identical runs on a uniform portfolio.
        let population = Simulation::new(term_model(0.08, 0.04));
        let per_group = Simulation::new(ProductModel::Term(TermLifeModel {
            mortality: Box::new(PolicyVaryingRate::new(|_, _| 0.08)),
            lapse: Box::new(PolicyVaryingRate::new(|_, _| 0.04)),
            ..TermLifeModel::default_pricing()
        }));

        let groups = vec![term_group(-1, 20, 100.0), term_group(-1, 20, 100.0)];
        let a = population.run(groups.clone(), 36, |_, _| {});
        let b = per_group.run(groups, 36, |_, _| {});

        for (left, right) in a.active.iter().zip(&b.active) {
            assert_eq!(left.count, right.count);
        }
    }

    #[test]
    fn test_monotonic_exposure() {
        let sim = Simulation::new(term_model(0.05, 0.10));
        let groups = vec![term_group(-6, 20, 100.0), term_group(3, 20, 50.0), term_group(9, 20, 25.0)];

        let mut previous = None;
        sim.run(groups, 24, |state, events| {
            let in_force = state.total_in_force();
            if let Some(prior) = previous {
                assert!(in_force <= prior + events.total_starts() + 1e-9);
            }
            previous = Some(in_force);
        });
    }

    #[test]
    fn test_new_business_admission() {
        let sim = Simulation::new(term_model(0.0, 0.0));
        let mut state = SimulationState::from_groups(vec![term_group(0, 20, 40.0), term_group(2, 20, 10.0)]);
        let mut events = EventRecord::new();

        // Month 0: the first group is admitted and charged acquisition cost
        sim.advance_one_step(&mut state, &mut events);
        assert_eq!(events.starts.len(), 1);
        assert_eq!(events.total_starts(), 40.0);
        assert_relative_eq!(events.expenses, 300.0 * 40.0);
        assert_eq!(state.active.len(), 1);
        assert_eq!(state.inactive.len(), 1);

        // Month 1: nothing to admit
        events.clear();
        sim.advance_one_step(&mut state, &mut events);
        assert!(events.starts.is_empty());

        // Month 2: the second group arrives
        events.clear();
        sim.advance_one_step(&mut state, &mut events);
        assert_eq!(events.total_starts(), 10.0);
        assert!(state.inactive.is_empty());
    }

    #[test]
    fn test_term_expiry_removes_group_without_claim() {
        let sim = Simulation::new(term_model(0.0, 0.0));
        let mut state = SimulationState::from_groups(vec![term_group(-11, 1, 30.0)]);
        let mut events = EventRecord::new();

        sim.advance_one_step(&mut state, &mut events);
        assert!(events.expirations.is_empty());

        // Month 1 == issue (-11) + 12: maturity
        events.clear();
        sim.advance_one_step(&mut state, &mut events);
        assert_eq!(events.expirations.len(), 1);
        assert_eq!(events.claimed, 0.0);
        assert!(state.active.is_empty());
    }

    #[test]
    fn test_whole_of_life_never_expires() {
        let policy = Policy::account_based(
            Sex::Female,
            50,
            -1,
            None,
            100_000.0,
            100_000.0,
            PremiumMode::Single,
        );
        let model = universal_model(0.0, 0.0, vec![0.0; 600]);
        let sim = Simulation::new(ProductModel::Universal(model));

        let state = sim.run(vec![PolicyGroup::new(policy, 10.0)], 600, |_, _| {});
        assert_eq!(state.active.len(), 1);
    }

    #[test]
    fn test_account_roll_forward() {
        let policy = Policy::account_based(
            Sex::Male,
            50,
            0,
            Some(10),
            250_000.0,
            100_000.0,
            PremiumMode::Single,
        );
        let model = universal_model(0.0, 0.0, vec![0.01; 12]);
        let sim = Simulation::new(ProductModel::Universal(model));

        let mut state = SimulationState::from_groups(vec![PolicyGroup::new(policy, 1.0)]);
        let mut events = EventRecord::new();
        sim.advance_one_step(&mut state, &mut events);

        // 100k premium, 5% load -> 95k in; 0.1% fee on 95k = 95;
        // amount at risk = max(94905, 250000); COI = 25; 1% credit on 94880
        let (_, changes) = &events.account_changes[0];
        assert_relative_eq!(changes.premium_paid, 100_000.0);
        assert_relative_eq!(changes.premium_into_account, 95_000.0, max_relative = 1e-12);
        assert_relative_eq!(changes.insurance_cost, 25.0, max_relative = 1e-9);
        assert_relative_eq!(changes.investment_credit, 948.80, max_relative = 1e-9);
        assert_relative_eq!(changes.net_change, 95_828.80, max_relative = 1e-9);
        assert_relative_eq!(state.active[0].policy.account_value, 95_828.80, max_relative = 1e-9);

        // Single premium: month 1 collects nothing
        events.clear();
        sim.advance_one_step(&mut state, &mut events);
        assert_relative_eq!(events.account_changes[0].1.premium_paid, 0.0);
    }

    #[test]
    fn test_account_death_claim_floors_at_assured() {
        let policy = Policy::account_based(
            Sex::Male,
            50,
            -1,
            Some(10),
            250_000.0,
            0.0,
            PremiumMode::Single,
        );
        let model = universal_model(0.12, 0.0, vec![0.0; 12]);
        let sim = Simulation::new(ProductModel::Universal(model));

        let mut state = SimulationState::from_groups(vec![PolicyGroup::new(policy, 100.0)]);
        let mut events = EventRecord::new();
        sim.advance_one_step(&mut state, &mut events);

        // Small account: death benefit is the assured amount
        let deaths = events.total_deaths();
        assert!(deaths > 0.0);
        assert_relative_eq!(events.claimed, deaths * 250_000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_run_invokes_callback_each_step() {
        let sim = Simulation::new(term_model(0.01, 0.01));
        let mut months = Vec::new();

        let state = sim.run(vec![term_group(-1, 20, 100.0)], 5, |_, events| {
            months.push(events.month);
        });

        assert_eq!(months, vec![0, 1, 2, 3, 4]);
        assert_eq!(state.month, 5);
    }
}
