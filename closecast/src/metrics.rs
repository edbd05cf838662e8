//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Absolute Percentage Error, relative to the forecast, as a fraction
    pub mape: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Symmetric Mean Absolute Percentage Error, in percent
    pub smape: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ForecastMetrics {
    /// Evaluate forecast accuracy against actual values
    pub fn evaluate(actual: &[f64], forecast: &[f64]) -> Result<Self> {
        if forecast.len() != actual.len() || forecast.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Forecast and actual values must have the same non-zero length".to_string(),
            ));
        }

        let n = forecast.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(forecast).map(|(a, f)| a - f).collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
        let rmse = mse.sqrt();

        // Scaled by the forecast rather than the actual value
        let mape = errors
            .iter()
            .zip(forecast)
            .map(|(e, f)| (e / f).abs())
            .sum::<f64>()
            / n;

        let smape = actual
            .iter()
            .zip(forecast)
            .map(|(&a, &f)| {
                let denom = a.abs() + f.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    200.0 * (f - a).abs() / denom
                }
            })
            .sum::<f64>()
            / n;

        Ok(Self {
            mae,
            mape,
            mse,
            rmse,
            smape,
        })
    }

    /// Copy with every metric rounded to two decimals for reporting
    pub fn rounded(&self) -> Self {
        Self {
            mae: round2(self.mae),
            mape: round2(self.mape),
            mse: round2(self.mse),
            rmse: round2(self.rmse),
            smape: round2(self.smape),
        }
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rounded();
        writeln!(f, "Mean absolute error/deviation (MAE/MAD): {}", r.mae)?;
        writeln!(f, "Mean absolute percent error (MAPE): {}", r.mape)?;
        writeln!(f, "Mean squared error: {}", r.mse)?;
        writeln!(f, "Root mean squared error (RMSE): {}", r.rmse)?;
        write!(f, "SMAPE: {}", r.smape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mape_divides_by_forecast() {
        let actual = [110.0, 90.0];
        let forecast = [100.0, 100.0];
        let metrics = ForecastMetrics::evaluate(&actual, &forecast).unwrap();

        // |10/100| and |-10/100|; dividing by the actuals would give 0.1010...
        assert_relative_eq!(metrics.mape, 0.1);
        let textbook = (10.0 / 110.0 + 10.0 / 90.0) / 2.0;
        assert!((metrics.mape - textbook).abs() > 1e-3);
    }

    #[test]
    fn error_metrics() {
        let actual = [3.0, 5.0, 2.0];
        let forecast = [2.0, 5.0, 4.0];
        let metrics = ForecastMetrics::evaluate(&actual, &forecast).unwrap();

        assert_relative_eq!(metrics.mae, 1.0);
        assert_relative_eq!(metrics.mse, 5.0 / 3.0);
        assert_relative_eq!(metrics.rmse, (5.0_f64 / 3.0).sqrt());
        let smape = (200.0 * 1.0 / 5.0 + 0.0 + 200.0 * 2.0 / 6.0) / 3.0;
        assert_relative_eq!(metrics.smape, smape);
    }

    #[test]
    fn smape_counts_zero_pairs_as_zero() {
        let metrics = ForecastMetrics::evaluate(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert_eq!(metrics.smape, 0.0);
    }

    #[test]
    fn rounding_only_for_reporting() {
        let metrics = ForecastMetrics::evaluate(&[1.0, 2.0, 4.0], &[1.5, 2.0, 3.0]).unwrap();
        assert_relative_eq!(metrics.mae, 0.5);
        assert_relative_eq!(metrics.rounded().mse, 0.42);
        assert_relative_eq!(metrics.mse, 1.25 / 3.0);
        assert!(metrics.to_string().contains("MAPE"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(ForecastMetrics::evaluate(&[1.0], &[1.0, 2.0]).is_err());
        assert!(ForecastMetrics::evaluate(&[], &[]).is_err());
    }
}
