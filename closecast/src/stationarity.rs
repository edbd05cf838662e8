//! Differencing-order estimation with KPSS and ADF unit-root tests
//!
//! Both tests answer the same question for a series: should it be
//! differenced once more? [`ndiffs`] keeps differencing while the answer is
//! yes, and [`estimate_differencing`] takes the larger of the two orders so
//! that both stationarity criteria hold at once.

use crate::config::StationarityConfig;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use tracing::debug;
use ts_math::differencing::{difference, is_constant};
use ts_math::regression::ols;
use ts_math::stats::{autocovariance, interpolate, mean};

/// KPSS level-stationarity critical values and their p-values
const KPSS_TABLE: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const KPSS_TABLE_P: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

/// ADF (constant + trend) critical values, one row per p-value in
/// `ADF_TABLE_P`, one column per sample size in `ADF_TABLE_T`.
const ADF_TABLE: [[f64; 6]; 8] = [
    [-4.38, -4.15, -4.04, -3.99, -3.98, -3.96],
    [-3.95, -3.80, -3.73, -3.69, -3.68, -3.66],
    [-3.60, -3.50, -3.45, -3.43, -3.42, -3.41],
    [-3.24, -3.18, -3.15, -3.13, -3.13, -3.12],
    [-1.14, -1.19, -1.22, -1.23, -1.24, -1.25],
    [-0.80, -0.87, -0.90, -0.92, -0.93, -0.94],
    [-0.50, -0.58, -0.62, -0.64, -0.65, -0.66],
    [-0.15, -0.24, -0.28, -0.31, -0.32, -0.33],
];
const ADF_TABLE_T: [f64; 6] = [25.0, 50.0, 100.0, 250.0, 500.0, 100_000.0];
const ADF_TABLE_P: [f64; 8] = [0.01, 0.025, 0.05, 0.10, 0.90, 0.95, 0.975, 0.99];

/// Which unit-root test drives [`ndiffs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitRootTest {
    /// Kwiatkowski–Phillips–Schmidt–Shin; null hypothesis is stationarity
    Kpss,
    /// Augmented Dickey–Fuller; null hypothesis is a unit root
    Adf,
}

/// Result of one test application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    /// `NaN` when the test cannot be computed on the input
    pub p_value: f64,
    pub should_diff: bool,
}

impl TestOutcome {
    fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            should_diff: false,
        }
    }
}

impl UnitRootTest {
    /// Apply the test to `x` at significance level `alpha`
    pub fn run(self, x: &[f64], alpha: f64) -> TestOutcome {
        match self {
            UnitRootTest::Kpss => kpss(x, alpha),
            UnitRootTest::Adf => adf(x, alpha),
        }
    }
}

/// KPSS test for level stationarity with the short Bartlett window
pub fn kpss(x: &[f64], alpha: f64) -> TestOutcome {
    let n = x.len();
    if n < 2 {
        return TestOutcome::undefined();
    }

    let m = mean(x);
    let residuals: Vec<f64> = x.iter().map(|v| v - m).collect();

    let mut cumsum = 0.0;
    let eta = residuals
        .iter()
        .map(|r| {
            cumsum += r;
            cumsum * cumsum
        })
        .sum::<f64>()
        / (n * n) as f64;

    let lags = (3.0 * (n as f64).sqrt() / 13.0).trunc() as usize;
    let mut s2 = autocovariance(&residuals, 0);
    for lag in 1..=lags {
        let weight = 1.0 - lag as f64 / (lags + 1) as f64;
        s2 += 2.0 * weight * autocovariance(&residuals, lag);
    }
    if s2 <= 0.0 {
        return TestOutcome::undefined();
    }

    let statistic = eta / s2;
    let p_value = interpolate(&KPSS_TABLE, &KPSS_TABLE_P, statistic).unwrap_or(f64::NAN);

    TestOutcome {
        statistic,
        p_value,
        should_diff: p_value < alpha,
    }
}

/// Augmented Dickey–Fuller test with constant and trend,
/// `k = trunc((n - 1)^(1/3))` lags
pub fn adf(x: &[f64], alpha: f64) -> TestOutcome {
    if x.len() < 3 {
        return TestOutcome::undefined();
    }
    let k = ((x.len() - 1) as f64).cbrt().trunc().max(1.0) as usize;
    let dy = difference(x, 1);
    let n = dy.len();
    if n <= k {
        return TestOutcome::undefined();
    }

    let mut response = Vec::with_capacity(n - k);
    let mut rows = Vec::with_capacity(n - k);
    for t in k..n {
        response.push(dy[t]);
        let mut row = Vec::with_capacity(k + 3);
        row.push(1.0);
        row.push(x[t]);
        row.push((t + 1) as f64);
        for lag in 1..=k {
            row.push(dy[t - lag]);
        }
        rows.push(row);
    }

    let statistic = match ols(&response, &rows).map(|fit| fit.t_statistic(1)) {
        Ok(Some(t)) => t,
        Ok(None) | Err(_) => return TestOutcome::undefined(),
    };

    let critical: Vec<f64> = ADF_TABLE
        .iter()
        .map(|row| interpolate(&ADF_TABLE_T, row, n as f64).unwrap_or(f64::NAN))
        .collect();
    let p_value = interpolate(&critical, &ADF_TABLE_P, statistic).unwrap_or(f64::NAN);

    TestOutcome {
        statistic,
        p_value,
        should_diff: p_value > alpha,
    }
}

/// Smallest differencing order in `0..=max_d` after which `test` no longer
/// asks for differencing.
pub fn ndiffs(x: &[f64], alpha: f64, test: UnitRootTest, max_d: usize) -> Result<usize> {
    if max_d == 0 {
        return Err(ForecastError::InvalidParameter(
            "max_d must be positive".to_string(),
        ));
    }
    if is_constant(x) {
        return Ok(0);
    }

    let mut d = 0;
    let mut series = x.to_vec();
    let mut outcome = test.run(&series, alpha);
    if outcome.p_value.is_nan() {
        return Ok(0);
    }

    while outcome.should_diff && d < max_d {
        d += 1;
        series = difference(&series, 1);
        if is_constant(&series) {
            return Ok(d);
        }
        outcome = test.run(&series, alpha);
        debug!(?test, d, p_value = outcome.p_value, "unit root test");
        if outcome.p_value.is_nan() {
            return Ok(d - 1);
        }
    }

    Ok(d)
}

/// Differencing orders suggested by each test and the one used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifferencingEstimate {
    pub kpss: usize,
    pub adf: usize,
    pub n_diffs: usize,
}

/// Estimate the differencing order of the training series
pub fn estimate_differencing(train: &[f64], config: &StationarityConfig) -> Result<DifferencingEstimate> {
    let kpss = ndiffs(train, config.alpha, UnitRootTest::Kpss, config.max_d)?;
    let adf = ndiffs(train, config.alpha, UnitRootTest::Adf, config.max_d)?;
    Ok(DifferencingEstimate {
        kpss,
        adf,
        n_diffs: kpss.max(adf),
    })
}
