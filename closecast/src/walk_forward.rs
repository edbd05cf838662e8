//! Walk-forward one-step evaluation on held-out observations

use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use serde::Serialize;
use tracing::debug;

/// One-step forecasts aligned with the held-out values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkForwardResult {
    pub forecasts: Vec<f64>,
    pub intervals: Vec<(f64, f64)>,
}

impl WalkForwardResult {
    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}

/// Forecast each value of `test` one step ahead, then feed the true value
/// back into the model before moving on.
///
/// The model is advanced in place and ends up conditioned on every test
/// value.
pub fn walk_forward<M: FittedModel + ?Sized>(model: &mut M, test: &[f64]) -> Result<WalkForwardResult> {
    let mut forecasts = Vec::with_capacity(test.len());
    let mut intervals = Vec::with_capacity(test.len());

    for (step, &actual) in test.iter().enumerate() {
        let forecast = model.forecast(1)?;
        let (point, interval) = match (forecast.values().first(), forecast.intervals().first()) {
            (Some(&point), Some(&interval)) => (point, interval),
            _ => {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} returned an empty one-step forecast",
                    model.name()
                )))
            }
        };
        debug!(step, point, actual, "walk-forward step");

        forecasts.push(point);
        intervals.push(interval);
        model.assimilate(actual)?;
    }

    Ok(WalkForwardResult {
        forecasts,
        intervals,
    })
}
