//! Pipeline configuration
//!
//! Every parameter of a run lives here. [`PipelineConfig::default`] reproduces
//! the fixed behaviour of the forecaster; a TOML file may override any subset
//! of fields.

use crate::error::{ForecastError, Result};
use crate::models::selection::SelectionConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for differencing-order estimation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StationarityConfig {
    /// Significance level shared by the KPSS and ADF tests
    pub alpha: f64,
    /// Largest differencing order considered
    pub max_d: usize,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            max_d: 6,
        }
    }
}

/// Full configuration of a forecasting run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV with `Date` and `Close` columns
    pub input_path: PathBuf,
    /// Persisted forecast ledger (read, then overwritten)
    pub ledger_path: PathBuf,
    /// Directory receiving chart artifacts
    pub output_dir: PathBuf,
    /// Share of the series used for model selection
    pub train_ratio: f64,
    pub stationarity: StationarityConfig,
    pub selection: SelectionConfig,
    /// Number of business days forecast past the last known date
    pub horizon: usize,
    /// Coverage of the reported confidence intervals
    pub confidence_level: f64,
    /// Number of lags drawn in the autocorrelation chart
    pub lag_plot_lags: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("gsef_output/historical_gsef.csv"),
            ledger_path: PathBuf::from("gsef_output/gsef_forecast.csv"),
            output_dir: PathBuf::from("gsef_output"),
            train_ratio: 0.65,
            stationarity: StationarityConfig::default(),
            selection: SelectionConfig::default(),
            horizon: 10,
            confidence_level: 0.95,
            lag_plot_lags: 6,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file; missing fields keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| ForecastError::Parse(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train_ratio must be in (0, 1), got {}",
                self.train_ratio
            )));
        }
        if !(self.stationarity.alpha > 0.0 && self.stationarity.alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.stationarity.alpha
            )));
        }
        if self.stationarity.max_d == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_d must be positive".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least one business day".to_string(),
            ));
        }
        self.selection.validate()
    }
}
