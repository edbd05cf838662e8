//! Forecasting models for closing price series

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Forecast result containing predicted values and their intervals
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// One `(lower, upper)` interval per value
    intervals: Vec<(f64, f64)>,
    /// Coverage of the intervals
    confidence_level: f64,
}

impl ForecastResult {
    /// Create a new forecast result with confidence intervals
    pub fn new(values: Vec<f64>, intervals: Vec<(f64, f64)>, confidence_level: f64) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        Ok(Self {
            values,
            intervals,
            confidence_level,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the confidence intervals
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }
}

/// A fitted model whose state can be advanced one observation at a time
pub trait FittedModel: Debug {
    /// Forecast the next `horizon` values with confidence intervals
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Incorporate one newly observed value without a full re-estimation
    fn assimilate(&mut self, observation: f64) -> Result<()>;

    /// Name of the model
    fn name(&self) -> &str;

    /// Human-readable description of the fitted parameters
    fn summary(&self) -> String;
}

/// Forecast model that can be fitted to a series
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to `data`
    fn fit(&self, data: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Two-sided standard normal quantile for `confidence_level` coverage
pub fn normal_quantile(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ForecastError::InvalidParameter(
            "Confidence level must be between 0 and 1".to_string(),
        ));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
}

pub mod arima;
pub mod selection;
