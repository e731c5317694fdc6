//! Per-period investment return paths for account-based products

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// A precomputed sequence of per-month investment returns, indexed by
/// absolute simulation month.
///
/// Any caller-supplied sequence is accepted; [`InvestmentPath::lognormal`] is
/// a convenience generator. Reading past the end of the path means the model
/// was configured for too few months and is a fatal misconfiguration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestmentPath {
    returns: Vec<f64>,
}

impl InvestmentPath {
    pub fn new(returns: Vec<f64>) -> Self {
        Self { returns }
    }

    /// Log-normal random walk: each month's gross return is
    /// `exp(N(drift, volatility))`, so the net return is that minus one.
    /// Seeded for reproducibility.
    pub fn lognormal(n_months: usize, drift: f64, volatility: f64, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let dist = Normal::new(drift, volatility).expect("invalid log-normal parameters");
        let returns = (0..n_months).map(|_| dist.sample(&mut rng).exp() - 1.0).collect();
        Self { returns }
    }

    /// Net return credited over the given month
    pub fn rate(&self, month: i32) -> f64 {
        assert!(month >= 0, "investment paths start at month 0, got {}", month);
        match self.returns.get(month as usize) {
            Some(&r) => r,
            None => panic!(
                "investment path covers {} months, no return for month {}",
                self.returns.len(),
                month
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}
