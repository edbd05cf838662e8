//! Chart specifications and their rendering
//!
//! Charts are plain values describing panels and series. A
//! [`ChartRenderer`] turns them into files; [`JsonChartRenderer`] writes
//! each spec as JSON so any plotting front end can draw it.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::future::ForecastRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use ts_math::stats::lag_pairs;

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Line,
    /// Line with point markers
    Markers,
    Scatter,
    /// Filled area between `lower` and `upper`
    Band,
}

/// X coordinate of a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    Index(f64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: AxisValue,
    pub y: f64,
    /// Upper bound for band series; `y` is the lower bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub style: SeriesStyle,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    fn new(label: &str, style: SeriesStyle, color: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            label: label.to_string(),
            style,
            color: color.to_string(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

/// A figure made of one or more panels laid out in `rows` x `columns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// File stem used by renderers
    pub name: String,
    pub title: String,
    pub rows: usize,
    pub columns: usize,
    pub panels: Vec<Panel>,
}

fn indexed(offset: usize, values: &[f64]) -> Vec<ChartPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| ChartPoint {
            x: AxisValue::Index((offset + i) as f64),
            y,
            upper: None,
        })
        .collect()
}

/// Scatter of `y[t]` against `y[t + lag]` for lags `1..=lags`, two per row
pub fn lag_plot_chart(series: &PriceSeries, lags: usize) -> ChartSpec {
    let closes = series.closes();
    let panels = (1..=lags)
        .map(|lag| {
            let points = lag_pairs(&closes, lag)
                .into_iter()
                .map(|(x, y)| ChartPoint {
                    x: AxisValue::Index(x),
                    y,
                    upper: None,
                })
                .collect();
            Panel {
                title: format!("Lag={}", lag),
                x_label: "y(t)".to_string(),
                y_label: format!("y(t + {})", lag),
                series: vec![ChartSeries::new("Close", SeriesStyle::Scatter, "blue", points)],
            }
        })
        .collect();

    ChartSpec {
        name: "autocorrelation".to_string(),
        title: "Autocorrelation plot".to_string(),
        rows: lags.div_ceil(2),
        columns: 2,
        panels,
    }
}

/// Training data with walk-forward forecasts against actuals, and the same
/// forecasts with their confidence band
pub fn forecast_chart(
    train: &[f64],
    forecasts: &[f64],
    actuals: &[f64],
    intervals: &[(f64, f64)],
) -> Result<ChartSpec> {
    if forecasts.len() != actuals.len() || forecasts.len() != intervals.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "forecasts ({}), actuals ({}) and intervals ({}) must align",
            forecasts.len(),
            actuals.len(),
            intervals.len()
        )));
    }
    let offset = train.len();
    let training = ChartSeries::new("Training Data", SeriesStyle::Line, "blue", indexed(0, train));

    let band = intervals
        .iter()
        .enumerate()
        .map(|(i, &(lower, upper))| ChartPoint {
            x: AxisValue::Index((offset + i) as f64),
            y: lower,
            upper: Some(upper),
        })
        .collect();

    let actual_vs_predicted = Panel {
        title: "Prices Forecast".to_string(),
        x_label: "Dates".to_string(),
        y_label: "Prices".to_string(),
        series: vec![
            training.clone(),
            ChartSeries::new("Predicted Price", SeriesStyle::Markers, "green", indexed(offset, forecasts)),
            ChartSeries::new("Actual Price", SeriesStyle::Line, "red", indexed(offset, actuals)),
        ],
    };
    let with_band = Panel {
        title: "Prices Forecasts & Confidence Intervals".to_string(),
        x_label: "Dates".to_string(),
        y_label: "Prices".to_string(),
        series: vec![
            training,
            ChartSeries::new("Predicted Price", SeriesStyle::Line, "green", indexed(offset, forecasts)),
            ChartSeries::new("Confidence Intervals", SeriesStyle::Band, "orange", band),
        ],
    };

    Ok(ChartSpec {
        name: "forecast_vs_actual".to_string(),
        title: "Walk-forward forecasts".to_string(),
        rows: 2,
        columns: 1,
        panels: vec![actual_vs_predicted, with_band],
    })
}

/// Date-indexed line of the future forecasts
pub fn future_forecast_chart(records: &[ForecastRecord]) -> ChartSpec {
    let points = records
        .iter()
        .map(|r| ChartPoint {
            x: AxisValue::Date(r.date),
            y: r.forecast,
            upper: None,
        })
        .collect();

    ChartSpec {
        name: format!("{}_day_forecast", records.len()),
        title: format!("{} Business Days Forecast", records.len()),
        rows: 1,
        columns: 1,
        panels: vec![Panel {
            title: format!("{} Business Days Forecast", records.len()),
            x_label: "Date".to_string(),
            y_label: "Forecasted Price".to_string(),
            series: vec![ChartSeries::new(
                "Forecasted Closing Price",
                SeriesStyle::Line,
                "dodgerblue",
                points,
            )],
        }],
    }
}

/// Persists chart specs
pub trait ChartRenderer {
    /// Render `chart`, replacing any previous output; returns the written path
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf>;
}

/// Writes `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct JsonChartRenderer {
    output_dir: PathBuf,
}

impl JsonChartRenderer {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, chart: &ChartSpec) -> PathBuf {
        self.output_dir.join(format!("{}.json", chart.name))
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<PathBuf> {
        let path = self.path_for(chart);
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ForecastError::write_failure(&self.output_dir, e))?;

        if path.exists() {
            fs::remove_file(&path).map_err(|e| ForecastError::write_failure(&path, e))?;
        } else {
            info!(path = %path.display(), "Chart didn't exist and will be created");
        }

        let json = serde_json::to_string_pretty(chart)?;
        fs::write(&path, json).map_err(|e| ForecastError::write_failure(&path, e))?;
        Ok(path)
    }
}
