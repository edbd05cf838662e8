//! Forecasts dated over the business days after the last observation

use crate::calendar::business_days_after;
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use chrono::NaiveDate;
use serde::Serialize;

/// A forecast value keyed to a future business day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub forecast: f64,
    pub interval: (f64, f64),
}

/// Forecast `horizon` business days past the end of `series`
pub fn forecast_business_days<M: FittedModel + ?Sized>(
    model: &M,
    series: &PriceSeries,
    horizon: usize,
) -> Result<Vec<ForecastRecord>> {
    let last_date = series.last_date().ok_or_else(|| {
        ForecastError::InsufficientData("cannot date forecasts of an empty series".to_string())
    })?;

    let forecast = model.forecast(horizon)?;
    let dates = business_days_after(last_date, horizon);

    Ok(dates
        .into_iter()
        .zip(forecast.values().iter().zip(forecast.intervals()))
        .map(|(date, (&value, &interval))| ForecastRecord {
            date,
            forecast: value,
            interval,
        })
        .collect())
}

/// Row of the observed-plus-forecast table used for charting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedRow {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub forecast: Option<f64>,
}

/// Known closes followed by the forecast records
pub fn existing_with_forecast(series: &PriceSeries, records: &[ForecastRecord]) -> Vec<CombinedRow> {
    series
        .points()
        .iter()
        .map(|p| CombinedRow {
            date: p.date,
            close: Some(p.close),
            forecast: None,
        })
        .chain(records.iter().map(|r| CombinedRow {
            date: r.date,
            close: None,
            forecast: Some(r.forecast),
        }))
        .collect()
}
