//! Discounting of monthly cash flows for NPV
//!
//! The monthly rate is the stated annual rate divided by 12 (simple division,
//! not a compounding conversion).

use serde::{Deserialize, Serialize};

/// Annual discount rate, stored in percent as entered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountRate {
    pub annual_pct: f64,
}

impl DiscountRate {
    pub fn from_annual_pct(annual_pct: f64) -> Self {
        Self { annual_pct }
    }

    /// Periodic (monthly) rate as a decimal
    pub fn monthly_rate(&self) -> f64 {
        self.annual_pct / 100.0 / 12.0
    }

    /// NPV of monthly flows against an upfront cost paid at time 0
    pub fn npv(&self, initial_cost: f64, monthly_cash_flows: &[f64]) -> f64 {
        npv(self.monthly_rate(), initial_cost, monthly_cash_flows)
    }
}

/// Net present value: `-initial_cost + Σ cf[t-1] / (1 + r)^t` for t = 1..N
///
/// Rates at or below -1 give non-finite results.
pub fn npv(monthly_rate: f64, initial_cost: f64, monthly_cash_flows: &[f64]) -> f64 {
    let one_plus_r = 1.0 + monthly_rate;
    monthly_cash_flows
        .iter()
        .enumerate()
        .fold(-initial_cost, |acc, (i, &cf)| {
            acc + cf / one_plus_r.powi(i as i32 + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_monthly_rate_is_simple_division() {
        let rate = DiscountRate::from_annual_pct(6.0);
        assert_abs_diff_eq!(rate.monthly_rate(), 0.005, epsilon = 1e-15);
    }

    #[test]
    fn test_npv_level_annuity() {
        // $100/month for 12 months at 6% annual, nothing upfront
        let pv = npv(0.005, 0.0, &[100.0; 12]);
        // 100 * (1 - 1.005^-12) / 0.005
        assert_abs_diff_eq!(pv, 1161.89, epsilon = 0.01);
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let value = npv(0.0, 1000.0, &[300.0, 300.0, 300.0]);
        assert_abs_diff_eq!(value, -100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_npv_empty_flows() {
        assert_eq!(npv(0.01, 250.0, &[]), -250.0);
    }
}
