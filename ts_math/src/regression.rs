//! Ordinary least squares

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Result of an ordinary least squares fit
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    /// Estimated coefficients, one per regressor column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// Residuals `y - X·β`
    pub residuals: Vec<f64>,
    /// Residual sum of squares
    pub sse: f64,
}

impl OlsFit {
    /// t-ratio of coefficient `index`
    pub fn t_statistic(&self, index: usize) -> Option<f64> {
        let coefficient = self.coefficients.get(index)?;
        let se = self.std_errors.get(index)?;
        if *se > 0.0 && se.is_finite() {
            Some(coefficient / se)
        } else {
            None
        }
    }
}

/// Fit `y = X·β + ε` by ordinary least squares.
///
/// `rows` holds one regressor row per observation; every row must have the
/// same number of columns and there must be more observations than columns.
pub fn ols(y: &[f64], rows: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    if n != rows.len() {
        return Err(MathError::InvalidInput(format!(
            "Response length ({}) doesn't match regressor rows ({})",
            n,
            rows.len()
        )));
    }

    let k = rows.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "At least one regressor column is required".to_string(),
        ));
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(MathError::InvalidInput(
            "Regressor rows have inconsistent widths".to_string(),
        ));
    }
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "OLS with {} regressors needs more than {} observations, got {}",
            k, k, n
        )));
    }

    let x = DMatrix::from_row_iterator(n, k, rows.iter().flatten().copied());
    let y_vec = DVector::from_column_slice(y);

    // β = (X'X)^(-1) X'y
    let xtx = x.transpose() * &x;
    let xtx_inv = xtx.try_inverse().ok_or_else(|| {
        MathError::CalculationError("Regressor matrix is singular".to_string())
    })?;
    let beta = &xtx_inv * (x.transpose() * &y_vec);

    let residuals = &y_vec - &x * &beta;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let mse = sse / (n - k) as f64;

    let std_errors = (0..k)
        .map(|i| (mse * xtx_inv[(i, i)]).max(0.0).sqrt())
        .collect();

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        residuals: residuals.iter().copied().collect(),
        sse,
    })
}
