//! Discount curve for present-value calculations

use serde::{Deserialize, Serialize};

/// Annual spot rates indexed by duration in whole years.
///
/// A flat curve is a single entry; the last entry extends beyond the end of
/// the curve. The monthly discount factor is `(1 + rate)^(-months/12)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountCurve {
    spot_rates: Vec<f64>,
}

impl DiscountCurve {
    /// Flat curve at a single annual rate
    pub fn flat(annual_rate: f64) -> Self {
        Self { spot_rates: vec![annual_rate] }
    }

    /// Curve from annual spot rates by duration-in-years. An empty slice is
    /// treated as a flat zero curve.
    pub fn from_spot_rates(spot_rates: Vec<f64>) -> Self {
        if spot_rates.is_empty() {
            Self::flat(0.0)
        } else {
            Self { spot_rates }
        }
    }

    /// Annual spot rate for a duration in whole years
    pub fn rate_for_year(&self, year: u32) -> f64 {
        let idx = (year as usize).min(self.spot_rates.len() - 1);
        self.spot_rates[idx]
    }

    /// Discount factor from the given month back to the epoch
    pub fn factor(&self, months: i32) -> f64 {
        let months = months.max(0);
        let rate = self.rate_for_year((months / 12) as u32);
        (1.0 + rate).powf(-(months as f64) / 12.0)
    }
}

impl Default for DiscountCurve {
    fn default() -> Self {
        Self::flat(0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_factor() {
        let curve = DiscountCurve::flat(0.06);

        assert_relative_eq!(curve.factor(0), 1.0);
        assert_relative_eq!(curve.factor(12), 1.06_f64.powf(-1.0));
        assert_relative_eq!(curve.factor(18), 1.06_f64.powf(-1.5));
    }

    #[test]
    fn test_spot_curve_picks_rate_by_year() {
        let curve = DiscountCurve::from_spot_rates(vec![0.02, 0.03, 0.04]);

        assert_relative_eq!(curve.rate_for_year(0), 0.02);
        assert_relative_eq!(curve.factor(13), 1.03_f64.powf(-13.0 / 12.0));
        // Beyond the curve the last rate extends
        assert_relative_eq!(curve.rate_for_year(10), 0.04);
        assert_relative_eq!(curve.factor(120), 1.04_f64.powf(-10.0));
    }

    #[test]
    fn test_negative_months_clamp_to_epoch() {
        let curve = DiscountCurve::flat(0.05);
        assert_relative_eq!(curve.factor(-3), 1.0);
    }
}
