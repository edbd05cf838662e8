//! Descriptive statistics and table interpolation

use crate::{MathError, Result};

/// Arithmetic mean; `NaN` for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample autocovariance at `lag` of already demeaned `residuals`, divided
/// by the full length as in the Newey–West estimator.
pub fn autocovariance(residuals: &[f64], lag: usize) -> f64 {
    let n = residuals.len();
    if lag >= n {
        return 0.0;
    }
    residuals[lag..]
        .iter()
        .zip(residuals[..n - lag].iter())
        .map(|(a, b)| a * b)
        .sum::<f64>()
        / n as f64
}

/// Pairs `(y_t, y_{t+lag})` used for lag scatter plots
pub fn lag_pairs(data: &[f64], lag: usize) -> Vec<(f64, f64)> {
    if lag == 0 || lag >= data.len() {
        return Vec::new();
    }
    data.iter()
        .zip(data[lag..].iter())
        .map(|(&a, &b)| (a, b))
        .collect()
}

/// Piecewise linear interpolation of `y` over ascending `x`, clamped to the
/// end values outside the table range.
pub fn interpolate(x: &[f64], y: &[f64], at: f64) -> Result<f64> {
    if x.len() != y.len() || x.is_empty() {
        return Err(MathError::InvalidInput(
            "Interpolation table needs equal, non-zero lengths".to_string(),
        ));
    }
    if x.windows(2).any(|w| w[1] < w[0]) {
        return Err(MathError::InvalidInput(
            "Interpolation abscissae must be ascending".to_string(),
        ));
    }
    if at.is_nan() {
        return Ok(f64::NAN);
    }

    let last = x.len() - 1;
    if at <= x[0] {
        return Ok(y[0]);
    }
    if at >= x[last] {
        return Ok(y[last]);
    }

    let upper = x.iter().position(|&xi| xi >= at).unwrap_or(last);
    let lower = upper - 1;
    let span = x[upper] - x[lower];
    if span == 0.0 {
        return Ok(y[lower]);
    }
    let weight = (at - x[lower]) / span;
    Ok(y[lower] + weight * (y[upper] - y[lower]))
}
