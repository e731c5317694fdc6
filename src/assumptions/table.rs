//! Tabular rate provider indexed by attained age and bucketed duration

use super::rates::RateProvider;
use crate::policy::Policy;
use thiserror::Error;

/// Number of duration buckets in a rate table. Durations of 5+ years share
/// the final column.
pub const DURATION_BUCKETS: usize = 6;

/// Fatal configuration errors raised at table construction
#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("rate table must have at least one age row")]
    Empty,

    #[error("age {age} row has {found} duration columns, expected 6")]
    BadShape { age: u32, found: usize },
}

/// A 2-D annual-rate table: rows by attained age from a declared minimum,
/// columns by duration bucket `min(duration_years, 5)`.
///
/// Rates are inherently per-group (they depend on age and duration), so the
/// provider reports the per-policy capability. Ages past the oldest row clamp
/// to the final row; an age below `min_age` means the table does not cover
/// the portfolio and is treated as a fatal misconfiguration (panic).
#[derive(Debug, Clone)]
pub struct RateTable {
    min_age: u32,
    rows: Vec<[f64; DURATION_BUCKETS]>,
}

impl RateTable {
    /// Build a table from per-age rows, validating the shape.
    pub fn new(min_age: u32, rows: Vec<Vec<f64>>) -> Result<Self, RateTableError> {
        if rows.is_empty() {
            return Err(RateTableError::Empty);
        }

        let mut fixed = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            let age = min_age + i as u32;
            let cells: [f64; DURATION_BUCKETS] = row
                .try_into()
                .map_err(|bad: Vec<f64>| RateTableError::BadShape { age, found: bad.len() })?;
            fixed.push(cells);
        }

        Ok(Self { min_age, rows: fixed })
    }

    /// Illustrative select-and-ultimate mortality basis: Makeham ultimate
    /// rates with select discounts over the first five policy years.
    pub fn standard_select() -> Self {
        const SELECT_FACTORS: [f64; DURATION_BUCKETS] = [0.55, 0.65, 0.75, 0.85, 0.95, 1.0];
        let rows = (18..=120)
            .map(|age| {
                let ultimate: f64 = 0.00022 + 2.7e-6 * 1.124_f64.powi(age);
                SELECT_FACTORS
                    .iter()
                    .map(|f| (ultimate * f).min(1.0))
                    .collect()
            })
            .collect();

        Self::new(18, rows).expect("built-in table rows have a fixed shape")
    }

    /// Lowest age the table covers
    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    /// Annual rate for an attained age and duration in whole years.
    /// Negative durations use the first bucket.
    pub fn rate(&self, age: i32, duration_years: i32) -> f64 {
        assert!(
            age >= self.min_age as i32,
            "attained age {} is below the rate table minimum {}",
            age,
            self.min_age
        );
        let row = ((age - self.min_age as i32) as usize).min(self.rows.len() - 1);
        let bucket = duration_years.clamp(0, DURATION_BUCKETS as i32 - 1) as usize;
        self.rows[row][bucket]
    }
}

impl RateProvider for RateTable {
    /// Tabular rates vary by policy group; the engine must branch on
    /// [`RateProvider::per_policy`] before calling this.
    fn annual_rate(&self, _month: i32) -> f64 {
        panic!("tabular rates vary by policy group; call annual_rate_for")
    }

    fn annual_rate_for(&self, month: i32, policy: &Policy) -> f64 {
        self.rate(policy.attained_age(month), policy.duration_years(month))
    }

    fn per_policy(&self) -> bool {
        true
    }
}
