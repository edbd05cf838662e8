//! # Closecast workspace
//!
//! Re-exports the workspace crates under one roof.
//!
//! ```
//! use closecast_workspace::closecast::metrics::ForecastMetrics;
//!
//! let metrics = ForecastMetrics::evaluate(&[110.0, 90.0], &[100.0, 100.0]).unwrap();
//! assert_eq!(metrics.rounded().mape, 0.1);
//! ```

pub use closecast;
pub use ts_math;
