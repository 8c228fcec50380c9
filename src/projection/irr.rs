//! Internal Rate of Return (IRR) calculation
//!
//! Plain Newton-Raphson with a fixed iteration cap and step tolerance, no
//! bisection fallback. Series that make Newton diverge or oscillate report `None`.

use log::debug;

use super::rounding::round_to;

/// Starting rate for the Newton iteration (monthly)
pub const DEFAULT_IRR_GUESS: f64 = 0.10;

/// Iteration cap
pub const MAX_IRR_ITERATIONS: u32 = 1000;

/// Convergence threshold on the step `|r_new - r_old|`
pub const IRR_TOLERANCE: f64 = 1e-5;

/// Calculate the periodic IRR of a series of cash flows.
///
/// # Arguments
/// * `cashflows` - `cashflows[0]` is the upfront outlay (negative), the rest are
///   periodic net flows
/// * `guess` - initial periodic rate
///
/// # Returns
/// * `Option<f64>` - periodic (monthly) IRR as a decimal, or `None` if the
///   iteration did not converge within [`MAX_IRR_ITERATIONS`]
pub fn calculate_irr(cashflows: &[f64], guess: f64) -> Option<f64> {
    let mut rate = guess;

    for iteration in 0..MAX_IRR_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);
        let new_rate = rate - npv / dnpv;

        // NaN steps never satisfy this, so a blown-up iteration runs to the cap
        if (new_rate - rate).abs() < IRR_TOLERANCE {
            debug!("IRR converged to {new_rate:.8} after {} iterations", iteration + 1);
            return Some(new_rate);
        }

        rate = new_rate;
    }

    debug!(
        "IRR did not converge within {MAX_IRR_ITERATIONS} iterations ({} flows)",
        cashflows.len()
    );
    None
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Annualize a monthly IRR: `((1 + r)^12 - 1) * 100`, rounded to 2 decimals.
/// `None` (no IRR) reports as 0.
pub fn annualized_irr_pct(monthly_irr: Option<f64>) -> f64 {
    match monthly_irr {
        Some(r) => {
            let annual = ((1.0 + r).powi(12) - 1.0) * 100.0;
            if annual.is_finite() {
                round_to(annual, 2)
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}
