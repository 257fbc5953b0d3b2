//! Basis functions for the additive decomposition model.
//!
//! - piecewise-linear trend: `1`, `t`, and hinge terms `max(t - s_j, 0)` for each
//!   changepoint `s_j`
//! - yearly seasonality: Fourier pairs `sin(2πkd/P)`, `cos(2πkd/P)` for `k = 1..=order`,
//!   with `d` in days since the Unix epoch and `P = 365.25`

use std::f64::consts::PI;

/// Period of the yearly component in days.
pub const YEAR_DAYS: f64 = 365.25;

/// Hinge term for a trend changepoint at `s`.
pub fn hinge(t: f64, s: f64) -> f64 {
    (t - s).max(0.0)
}

/// Append `2 * order` Fourier terms for `days` (since epoch) with `period` to `out`.
pub fn push_fourier_terms(days: f64, period: f64, order: usize, out: &mut Vec<f64>) {
    for k in 1..=order {
        let arg = 2.0 * PI * k as f64 * days / period;
        out.push(arg.sin());
        out.push(arg.cos());
    }
}

/// Piecewise-linear trend value for base slope/offset and changepoint deltas.
pub fn piecewise_trend(t: f64, slope: f64, offset: f64, changepoints: &[f64], deltas: &[f64]) -> f64 {
    changepoints
        .iter()
        .zip(deltas)
        .fold(offset + slope * t, |acc, (s, d)| acc + d * hinge(t, *s))
}
