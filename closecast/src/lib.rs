//! # Closecast
//!
//! Auto-tuned ARIMA forecasts of a closing price series.
//!
//! ## Features
//!
//! - Price history loading and a chronological train/test split
//! - Differencing order estimation with KPSS and ADF tests
//! - Stepwise ARIMA order selection
//! - Walk-forward one-step evaluation with incremental model updates
//! - Accuracy metrics (MAE, MAPE, MSE, RMSE, SMAPE)
//! - Business-day forecasts reconciled into a persisted forecast ledger
//! - Chart specifications rendered to JSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use closecast::config::PipelineConfig;
//! use closecast::pipeline::ForecastPipeline;
//!
//! let config = PipelineConfig {
//!     input_path: "data/prices.csv".into(),
//!     ledger_path: "data/forecast.csv".into(),
//!     output_dir: "data".into(),
//!     ..PipelineConfig::default()
//! };
//!
//! let report = ForecastPipeline::new(config)?.run()?;
//! println!("{}", report.metrics);
//! for record in &report.future {
//!     println!("{} {:.2}", record.date, record.forecast);
//! }
//! # Ok::<(), closecast::ForecastError>(())
//! ```

pub mod calendar;
pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod future;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod stationarity;
pub mod walk_forward;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, PriceSeries};
pub use crate::error::ForecastError;
pub use crate::ledger::ForecastLedger;
pub use crate::metrics::ForecastMetrics;
pub use crate::models::{FittedModel, ForecastModel, ForecastResult};
pub use crate::pipeline::{ForecastPipeline, PipelineReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
