//! # TS Math
//!
//! Numerical building blocks for univariate time series modelling.
//! This crate provides differencing, least-squares regression, descriptive
//! statistics, table interpolation and a derivative-free minimiser.

use thiserror::Error;

pub mod differencing;
pub mod optimize;
pub mod regression;
pub mod stats;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
