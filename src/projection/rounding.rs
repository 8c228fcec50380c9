//! Rounding conventions used for reported figures

/// Round to the nearest integer, halves toward positive infinity
/// (`2.5 -> 3`, `-2.5 -> -2`)
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to a fixed number of decimal places, halves away from zero
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

/// Replace NaN/infinite values with 0
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
