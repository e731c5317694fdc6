//! Level-premium estimation from discounted claims and exposure
//!
//! Premiums must be known before a full simulation is meaningful, so this
//! runs a reduced decrement-only forward pass: no event recording, no
//! account roll-forward, just issue/expiry timing and mortality-then-lapse
//! decrements. The estimated premium is the discounted expected claim per
//! unit of discounted expected in-force exposure, marked up by the load.

use log::debug;

use crate::assumptions::TermLifeModel;
use crate::policy::PolicyGroup;

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate level monthly premiums for each group over `n_steps + 1`
/// periods. Returns replacement groups whose policies carry the estimated
/// premium; a pure function of its inputs.
pub fn estimate_premiums(
    model: &TermLifeModel,
    groups: &[PolicyGroup],
    n_steps: u32,
) -> Vec<PolicyGroup> {
    let mortality = model.mortality.as_ref();
    let lapse = model.lapse.as_ref();

    let mut counts: Vec<f64> = groups.iter().map(|group| group.count).collect();
    let mut claims = vec![0.0; groups.len()];
    let mut exposure = vec![0.0; groups.len()];

    for month in 0..=(n_steps as i32) {
        let population_death_rate = (!mortality.per_policy()).then(|| mortality.monthly_rate(month));
        let population_lapse_rate = (!lapse.per_policy()).then(|| lapse.monthly_rate(month));
        let discount = model.discount_factor(month);

        for (i, group) in groups.iter().enumerate() {
            let policy = &group.policy;
            if month < policy.issue_month {
                continue;
            }
            if let Some(expiry) = policy.expiry_month() {
                if month >= expiry {
                    continue;
                }
            }

            let death_rate = population_death_rate
                .unwrap_or_else(|| mortality.monthly_rate_for(month, policy));
            let lapse_rate = population_lapse_rate
                .unwrap_or_else(|| lapse.monthly_rate_for(month, policy));

            let deaths = counts[i] * death_rate;
            exposure[i] += counts[i] * discount;
            claims[i] += deaths * policy.assured * discount;
            counts[i] -= deaths + (counts[i] - deaths) * lapse_rate;
        }
    }

    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let premium = if exposure[i] > 0.0 {
                round_2dp((1.0 + model.premium_load) * claims[i] / exposure[i])
            } else {
                // Degenerate group with no in-force exposure over the horizon
                0.0
            };
            debug!("group {}: estimated premium {:.2}", i, premium);
            group.with_policy(group.policy.with_premium(premium))
        })
        .collect()
}
