//! ARIMA models for closing price forecasting
//!
//! Parameters are estimated by minimising the conditional sum of squares
//! (CSS) of the one-step residuals on the differenced series with a
//! Nelder–Mead simplex, starting from Hannan–Rissanen regression estimates.
//! Seasonal terms are multiplied out into plain AR/MA polynomials, so the
//! residual recursion and the forecast recursion only ever see lag vectors.

use crate::error::{ForecastError, Result};
use crate::models::{normal_quantile, FittedModel, ForecastModel, ForecastResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_math::differencing::{difference, level_anchors, undifference};
use ts_math::optimize::{nelder_mead, NelderMeadOptions};
use ts_math::regression::ols;
use ts_math::stats::mean;

/// Penalty returned for parameters outside the stationary/invertible region
const INFEASIBLE: f64 = f64::INFINITY;

/// Seasonal part of an order; only active when `period > 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order (P)
    pub p: usize,
    /// Seasonal MA order (Q)
    pub q: usize,
    /// Season length (m)
    pub period: usize,
}

impl SeasonalOrder {
    pub fn is_active(&self) -> bool {
        self.period > 1
    }
}

/// Orders of an ARIMA(p,d,q)(P,0,Q)[m] model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    pub seasonal: SeasonalOrder,
    /// Whether a mean is estimated for the differenced series
    pub with_intercept: bool,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal: SeasonalOrder::default(),
            with_intercept: d < 2,
        }
    }

    pub fn with_seasonal(mut self, seasonal: SeasonalOrder) -> Self {
        self.seasonal = seasonal;
        self
    }

    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.with_intercept = with_intercept;
        self
    }

    /// Seasonal AR and MA orders that actually enter the model
    fn active_seasonal(&self) -> (usize, usize, usize) {
        if self.seasonal.is_active() {
            (self.seasonal.p, self.seasonal.q, self.seasonal.period)
        } else {
            (0, 0, 0)
        }
    }

    /// Number of estimated coefficients (excluding the innovation variance)
    pub fn parameter_count(&self) -> usize {
        let (sp, sq, _) = self.active_seasonal();
        self.p + self.q + sp + sq + usize::from(self.with_intercept)
    }

    /// Sum of the AR and MA orders, seasonal included
    pub fn total_order(&self) -> usize {
        let (sp, sq, _) = self.active_seasonal();
        self.p + self.q + sp + sq
    }

    /// Largest AR lag after multiplying out the seasonal polynomial
    fn ar_span(&self) -> usize {
        let (sp, _, m) = self.active_seasonal();
        self.p + sp * m
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sp, sq, m) = self.active_seasonal();
        write!(
            f,
            "ARIMA({},{},{})({},0,{})[{}]",
            self.p, self.d, self.q, sp, sq, m
        )?;
        if self.with_intercept {
            write!(f, " intercept")?;
        }
        Ok(())
    }
}

/// Unfitted ARIMA model specification
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    order: ArimaOrder,
    /// Simplex iterations for the initial fit
    max_iterations: usize,
    /// Simplex iterations for each incremental update
    update_iterations: usize,
    /// Coverage of forecast intervals
    confidence_level: f64,
}

/// Estimated coefficients, split by role
#[derive(Debug, Clone, PartialEq)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    fn unpack(order: &ArimaOrder, params: &[f64]) -> Self {
        let (sp, sq, _) = order.active_seasonal();
        let mut rest = params;
        let intercept = if order.with_intercept {
            let (head, tail) = rest.split_at(1);
            rest = tail;
            head[0]
        } else {
            0.0
        };
        let mut take = |count: usize| -> Vec<f64> {
            let (head, tail) = rest.split_at(count);
            rest = tail;
            head.to_vec()
        };
        let ar = take(order.p);
        let ma = take(order.q);
        let seasonal_ar = take(sp);
        let seasonal_ma = take(sq);
        Self {
            intercept,
            ar,
            ma,
            seasonal_ar,
            seasonal_ma,
        }
    }

    fn pack(&self, order: &ArimaOrder) -> Vec<f64> {
        let mut params = Vec::with_capacity(order.parameter_count());
        if order.with_intercept {
            params.push(self.intercept);
        }
        params.extend(&self.ar);
        params.extend(&self.ma);
        params.extend(&self.seasonal_ar);
        params.extend(&self.seasonal_ma);
        params
    }

    /// AR lag coefficients `a` of `1 - Σ a_k B^k` after seasonal expansion
    fn expanded_ar(&self, period: usize) -> Vec<f64> {
        let short: Vec<f64> = self.ar.iter().map(|c| -c).collect();
        let seasonal: Vec<f64> = self.seasonal_ar.iter().map(|c| -c).collect();
        multiply_lag_polynomials(&short, &seasonal, period)
            .into_iter()
            .map(|c| -c)
            .collect()
    }

    /// MA lag coefficients `b` of `1 + Σ b_k B^k` after seasonal expansion
    fn expanded_ma(&self, period: usize) -> Vec<f64> {
        multiply_lag_polynomials(&self.ma, &self.seasonal_ma, period)
    }
}

/// Multiply `(1 + Σ a_i B^i)(1 + Σ s_j B^{j·period})`, returning the
/// coefficients of `B^1..` with trailing zeros trimmed.
fn multiply_lag_polynomials(short: &[f64], seasonal: &[f64], period: usize) -> Vec<f64> {
    if seasonal.is_empty() || period <= 1 {
        return short.to_vec();
    }
    let len = short.len() + seasonal.len() * period;
    let mut product = vec![0.0; len + 1];
    let mut lhs = vec![1.0];
    lhs.extend_from_slice(short);
    let mut rhs = vec![0.0; seasonal.len() * period + 1];
    rhs[0] = 1.0;
    for (j, s) in seasonal.iter().enumerate() {
        rhs[(j + 1) * period] = *s;
    }
    for (i, a) in lhs.iter().enumerate() {
        for (j, b) in rhs.iter().enumerate() {
            product[i + j] += a * b;
        }
    }
    product.remove(0);
    while product.last() == Some(&0.0) {
        product.pop();
    }
    product
}

/// Whether `1 - Σ a_k B^k` has all roots outside the unit circle, checked by
/// stepping the coefficients down to partial autocorrelations.
fn is_stationary(ar: &[f64]) -> bool {
    let mut coeffs: Vec<f64> = ar.to_vec();
    while coeffs.last() == Some(&0.0) {
        coeffs.pop();
    }
    while let Some(&kappa) = coeffs.last() {
        if !kappa.is_finite() || kappa.abs() >= 1.0 {
            return false;
        }
        let k = coeffs.len();
        let denom = 1.0 - kappa * kappa;
        let reduced: Vec<f64> = (0..k - 1)
            .map(|j| (coeffs[j] + kappa * coeffs[k - 2 - j]) / denom)
            .collect();
        coeffs = reduced;
    }
    true
}

/// Whether `1 + Σ b_k B^k` is invertible
fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|b| -b).collect();
    is_stationary(&negated)
}

/// CSS residuals of the differenced series `w`; the first `ar.len()`
/// residuals are conditioned to zero.
fn css_residuals(w: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let start = ar.len();
    let mut residuals = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut prediction = 0.0;
        for (i, a) in ar.iter().enumerate() {
            prediction += a * (w[t - 1 - i] - intercept);
        }
        for (j, b) in ma.iter().enumerate() {
            if t > j {
                prediction += b * residuals[t - 1 - j];
            }
        }
        residuals[t] = w[t] - intercept - prediction;
    }
    residuals
}

/// Information criteria of a CSS fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitStatistics {
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    /// Residuals entering the likelihood
    pub nobs: usize,
}

impl FitStatistics {
    fn from_residuals(residuals: &[f64], conditioned: usize, parameters: usize) -> Self {
        let used = &residuals[conditioned.min(residuals.len())..];
        let n = used.len() as f64;
        // An exact fit would give an infinite likelihood
        let sse = used.iter().map(|e| e * e).sum::<f64>().max(f64::MIN_POSITIVE);
        let sigma2 = sse / n;
        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0);

        // The innovation variance counts as an estimated parameter
        let k = (parameters + 1) as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let aicc = if n - k - 1.0 > 0.0 {
            aic + 2.0 * k * (k + 1.0) / (n - k - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = -2.0 * log_likelihood + k * n.ln();

        Self {
            sigma2,
            log_likelihood,
            aic,
            aicc,
            bic,
            nobs: used.len(),
        }
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    /// Name of the model
    name: String,
    order: ArimaOrder,
    coefficients: Coefficients,
    /// Observed levels, extended by every assimilated observation
    history: Vec<f64>,
    /// Residuals on the differenced scale
    residuals: Vec<f64>,
    statistics: FitStatistics,
    update_iterations: usize,
    confidence_level: f64,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
            max_iterations: 500,
            update_iterations: 5,
            confidence_level: 0.95,
        }
    }

    pub fn order(&self) -> &ArimaOrder {
        &self.order
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn with_update_iterations(mut self, iterations: usize) -> Self {
        self.update_iterations = iterations;
        self
    }

    /// Hannan–Rissanen estimates of the non-seasonal coefficients, used as
    /// the simplex starting point.
    fn initial_coefficients(&self, w: &[f64]) -> Coefficients {
        let (sp, sq, _) = self.order.active_seasonal();
        let intercept = if self.order.with_intercept { mean(w) } else { 0.0 };
        let mut start = Coefficients {
            intercept,
            ar: vec![0.0; self.order.p],
            ma: vec![0.0; self.order.q],
            seasonal_ar: vec![0.0; sp],
            seasonal_ma: vec![0.0; sq],
        };

        if self.order.p + self.order.q == 0 {
            return start;
        }
        if let Some((ar, ma)) = hannan_rissanen(w, intercept, self.order.p, self.order.q) {
            if is_stationary(&ar) && is_invertible(&ma) {
                start.ar = ar;
                start.ma = ma;
            }
        }
        start
    }

    fn objective<'a>(order: &'a ArimaOrder, w: &'a [f64]) -> impl Fn(&[f64]) -> f64 + 'a {
        move |params: &[f64]| {
            let coefficients = Coefficients::unpack(order, params);
            let ar = coefficients.expanded_ar(order.seasonal.period);
            let ma = coefficients.expanded_ma(order.seasonal.period);
            if !is_stationary(&ar) || !is_invertible(&ma) {
                return INFEASIBLE;
            }
            let residuals = css_residuals(w, coefficients.intercept, &ar, &ma);
            let used = &residuals[order.ar_span().min(residuals.len())..];
            let sse: f64 = used.iter().map(|e| e * e).sum();
            if !sse.is_finite() || used.is_empty() {
                return INFEASIBLE;
            }
            0.5 * (sse.max(f64::MIN_POSITIVE) / used.len() as f64).ln()
        }
    }
}

/// Two-stage regression estimates of an ARMA(p, q) on `w - intercept`
fn hannan_rissanen(w: &[f64], intercept: f64, p: usize, q: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let centered: Vec<f64> = w.iter().map(|v| v - intercept).collect();
    let n = centered.len();

    // Stage 1: long autoregression for proxy innovations
    let long = (p + q).max(10).min(n / 4);
    let innovations = if q > 0 {
        if long == 0 || n <= 2 * long + 1 {
            return None;
        }
        let rows: Vec<Vec<f64>> = (long..n)
            .map(|t| (1..=long).map(|i| centered[t - i]).collect())
            .collect();
        let fit = ols(&centered[long..], &rows).ok()?;
        let mut innovations = vec![0.0; long];
        innovations.extend(fit.residuals);
        innovations
    } else {
        vec![0.0; n]
    };

    // Stage 2: regress on own lags and lagged innovations
    let start = if q > 0 { long + q } else { p };
    let start = start.max(p);
    if n <= start + p + q + 1 {
        return None;
    }
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            (1..=p)
                .map(|i| centered[t - i])
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();
    let fit = ols(&centered[start..], &rows).ok()?;
    let (ar, ma) = fit.coefficients.split_at(p);
    Some((ar.to_vec(), ma.to_vec()))
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn fit(&self, data: &[f64]) -> Result<FittedArima> {
        let w = difference(data, self.order.d);
        let required = self.order.ar_span() + self.order.parameter_count() + 3;
        if w.len() < required {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least {} observations after differencing, got {}",
                self.order,
                required,
                w.len()
            )));
        }

        let start = self.initial_coefficients(&w).pack(&self.order);
        let objective = Self::objective(&self.order, &w);
        let minimum = nelder_mead(
            &objective,
            &start,
            NelderMeadOptions {
                max_iterations: self.max_iterations,
                ..NelderMeadOptions::default()
            },
        )?;
        if !minimum.value.is_finite() {
            return Err(ForecastError::ModelSelection(format!(
                "{} did not converge to a finite objective",
                self.order
            )));
        }

        let coefficients = Coefficients::unpack(&self.order, &minimum.point);
        FittedArima::from_parts(
            self.name.clone(),
            self.order,
            coefficients,
            data.to_vec(),
            self.update_iterations,
            self.confidence_level,
        )
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedArima {
    fn from_parts(
        name: String,
        order: ArimaOrder,
        coefficients: Coefficients,
        history: Vec<f64>,
        update_iterations: usize,
        confidence_level: f64,
    ) -> Result<Self> {
        let w = difference(&history, order.d);
        let ar = coefficients.expanded_ar(order.seasonal.period);
        let ma = coefficients.expanded_ma(order.seasonal.period);
        let residuals = css_residuals(&w, coefficients.intercept, &ar, &ma);
        let statistics =
            FitStatistics::from_residuals(&residuals, order.ar_span(), order.parameter_count());
        if !statistics.sigma2.is_finite() {
            return Err(ForecastError::ModelSelection(format!(
                "{} produced a non-finite innovation variance",
                order
            )));
        }

        Ok(Self {
            name,
            order,
            coefficients,
            history,
            residuals,
            statistics,
            update_iterations,
            confidence_level,
        })
    }

    pub fn order(&self) -> &ArimaOrder {
        &self.order
    }

    pub fn statistics(&self) -> &FitStatistics {
        &self.statistics
    }

    /// Number of observations seen so far, fitted and assimilated
    pub fn observations(&self) -> usize {
        self.history.len()
    }

    pub fn set_confidence_level(&mut self, confidence_level: f64) -> Result<()> {
        normal_quantile(confidence_level)?;
        self.confidence_level = confidence_level;
        Ok(())
    }

    /// ψ-weights of the integrated model, used for forecast variances
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let period = self.order.seasonal.period;
        let mut ar = self.coefficients.expanded_ar(period);
        let ma = self.coefficients.expanded_ma(period);

        // Fold (1 - B)^d into the AR polynomial
        for _ in 0..self.order.d {
            let mut widened = vec![0.0; ar.len() + 1];
            widened[0] = 1.0;
            for (i, a) in ar.iter().enumerate() {
                widened[i] += a;
                widened[i + 1] -= a;
            }
            ar = widened;
        }

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
            for (i, a) in ar.iter().enumerate().take(j) {
                value += a * psi[j - 1 - i];
            }
            psi.push(value);
        }
        psi
    }
}

impl FittedModel for FittedArima {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if self.history.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Model has not been fitted to data".to_string(),
            ));
        }

        let period = self.order.seasonal.period;
        let ar = self.coefficients.expanded_ar(period);
        let ma = self.coefficients.expanded_ma(period);
        let mu = self.coefficients.intercept;

        let mut centered: Vec<f64> = difference(&self.history, self.order.d)
            .iter()
            .map(|w| w - mu)
            .collect();
        let mut errors = self.residuals.clone();

        let mut differenced = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let t = centered.len();
            let mut next = 0.0;
            for (i, a) in ar.iter().enumerate() {
                if t > i {
                    next += a * centered[t - 1 - i];
                }
            }
            for (j, b) in ma.iter().enumerate() {
                if t > j {
                    next += b * errors[t - 1 - j];
                }
            }
            centered.push(next);
            errors.push(0.0);
            differenced.push(next + mu);
        }

        let anchors = level_anchors(&self.history, self.order.d);
        let values = undifference(&differenced, &anchors);

        let z = normal_quantile(self.confidence_level)?;
        let mut cumulative = 0.0;
        let intervals = self
            .psi_weights(horizon)
            .iter()
            .zip(values.iter())
            .map(|(psi, point)| {
                cumulative += psi * psi;
                let margin = z * (self.statistics.sigma2 * cumulative).sqrt();
                (point - margin, point + margin)
            })
            .collect();

        ForecastResult::new(values, intervals, self.confidence_level)
    }

    fn assimilate(&mut self, observation: f64) -> Result<()> {
        if !observation.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "cannot assimilate non-finite observation {}",
                observation
            )));
        }
        self.history.push(observation);

        let w = difference(&self.history, self.order.d);
        let coefficients = {
            let start = self.coefficients.pack(&self.order);
            let objective = ArimaModel::objective(&self.order, &w);
            let options = NelderMeadOptions {
                max_iterations: self.update_iterations,
                ..NelderMeadOptions::default()
            };
            match nelder_mead(&objective, &start, options) {
                Ok(minimum) if minimum.value.is_finite() => {
                    Coefficients::unpack(&self.order, &minimum.point)
                }
                // Keep the previous coefficients when the new point cannot be scored
                _ => self.coefficients.clone(),
            }
        };

        let ar = coefficients.expanded_ar(self.order.seasonal.period);
        let ma = coefficients.expanded_ma(self.order.seasonal.period);
        self.residuals = css_residuals(&w, coefficients.intercept, &ar, &ma);
        self.statistics = FitStatistics::from_residuals(
            &self.residuals,
            self.order.ar_span(),
            self.order.parameter_count(),
        );
        self.coefficients = coefficients;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn summary(&self) -> String {
        let mut s = format!("{} Model Summary\n", self.order);
        s.push_str(&"=".repeat(48));
        s.push('\n');
        s.push_str(&format!("No. Observations: {}\n", self.history.len()));

        if self.order.with_intercept {
            s.push_str(&format!("Intercept: {:.6}\n", self.coefficients.intercept));
        }
        let sections = [
            ("AR", "ar.L", &self.coefficients.ar),
            ("MA", "ma.L", &self.coefficients.ma),
            ("Seasonal AR", "ar.S.L", &self.coefficients.seasonal_ar),
            ("Seasonal MA", "ma.S.L", &self.coefficients.seasonal_ma),
        ];
        for (title, prefix, values) in sections {
            if values.is_empty() {
                continue;
            }
            s.push_str(&format!("{} Coefficients:\n", title));
            for (i, c) in values.iter().enumerate() {
                s.push_str(&format!("  {}{} = {:.6}\n", prefix, i + 1, c));
            }
        }

        s.push_str(&format!("Sigma²: {:.6}\n", self.statistics.sigma2));
        s.push_str(&format!("Log Likelihood: {:.3}\n", self.statistics.log_likelihood));
        s.push_str(&format!("AIC: {:.3}\n", self.statistics.aic));
        s.push_str(&format!("AICc: {:.3}\n", self.statistics.aicc));
        s.push_str(&format!("BIC: {:.3}\n", self.statistics.bic));

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use approx::assert_relative_eq;

    /// AR(1) process with seeded Gaussian noise
    fn ar1_series(phi: f64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(17);
        let noise = Normal::new(0.0, 0.05).unwrap();
        let mut data = vec![0.0];
        for i in 1..n {
            data.push(phi * data[i - 1] + noise.sample(&mut rng));
        }
        data
    }

    #[test]
    fn test_order_display() {
        assert_eq!(ArimaOrder::new(1, 1, 1).to_string(), "ARIMA(1,1,1)(0,0,0)[0] intercept");
        assert_eq!(ArimaOrder::new(0, 2, 1).to_string(), "ARIMA(0,2,1)(0,0,0)[0]");
        let seasonal = ArimaOrder::new(1, 0, 0).with_seasonal(SeasonalOrder { p: 1, q: 0, period: 5 });
        assert_eq!(seasonal.to_string(), "ARIMA(1,0,0)(1,0,0)[5] intercept");
    }

    #[test]
    fn test_stationarity_check() {
        assert!(is_stationary(&[0.5]));
        assert!(!is_stationary(&[1.0]));
        assert!(is_stationary(&[0.5, 0.3]));
        assert!(!is_stationary(&[0.5, 0.6]));
        assert!(is_stationary(&[]));
        assert!(is_invertible(&[0.4]));
        assert!(!is_invertible(&[-1.2]));
    }

    #[test]
    fn test_seasonal_expansion() {
        // (1 + 0.5B)(1 + 0.2B^3) = 1 + 0.5B + 0.2B^3 + 0.1B^4
        let product = multiply_lag_polynomials(&[0.5], &[0.2], 3);
        assert_eq!(product.len(), 4);
        assert_relative_eq!(product[0], 0.5);
        assert_relative_eq!(product[1], 0.0);
        assert_relative_eq!(product[2], 0.2);
        assert_relative_eq!(product[3], 0.1);
    }

    #[test]
    fn test_ar_coefficient_recovered() {
        let data = ar1_series(0.7, 300);
        let fitted = ArimaModel::new(ArimaOrder::new(1, 0, 0)).fit(&data).unwrap();
        assert!((fitted.coefficients.ar[0] - 0.7).abs() < 0.2);
        assert!(fitted.statistics().aic.is_finite());
    }

    #[test]
    fn test_forecast_of_linear_trend_continues_it() {
        let data: Vec<f64> = (0..60).map(|i| 10.0 + 2.0 * i as f64 + 0.01 * ((i * 37) % 7) as f64).collect();
        let fitted = ArimaModel::new(ArimaOrder::new(0, 1, 0)).fit(&data).unwrap();
        let forecast = fitted.forecast(3).unwrap();

        assert_eq!(forecast.horizons(), 3);
        let last = *data.last().unwrap();
        assert!((forecast.values()[0] - (last + 2.0)).abs() < 0.1);
        assert!((forecast.values()[2] - (last + 6.0)).abs() < 0.3);
    }

    #[test]
    fn test_intervals_widen_with_horizon() {
        let data = ar1_series(0.6, 200);
        let fitted = ArimaModel::new(ArimaOrder::new(1, 1, 0)).fit(&data).unwrap();
        let forecast = fitted.forecast(5).unwrap();

        let widths: Vec<f64> = forecast.intervals().iter().map(|(lo, hi)| hi - lo).collect();
        assert!(widths.iter().all(|w| *w > 0.0));
        assert!(widths.windows(2).all(|w| w[1] >= w[0]));
        for (value, (lo, hi)) in forecast.values().iter().zip(forecast.intervals()) {
            assert!(lo < value && value < hi);
        }
    }

    #[test]
    fn test_assimilate_extends_history() {
        let data = ar1_series(0.5, 120);
        let mut fitted = ArimaModel::new(ArimaOrder::new(1, 0, 1)).fit(&data).unwrap();
        let before = fitted.forecast(1).unwrap().values()[0];

        fitted.assimilate(before + 0.05).unwrap();
        assert_eq!(fitted.observations(), 121);
        assert!(fitted.forecast(1).unwrap().values()[0].is_finite());
        assert!(fitted.assimilate(f64::NAN).is_err());
    }

    #[test]
    fn test_insufficient_data() {
        let result = ArimaModel::new(ArimaOrder::new(2, 1, 2)).fit(&[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    }

    #[test]
    fn test_summary_lists_coefficients() {
        let data = ar1_series(0.5, 120);
        let fitted = ArimaModel::new(ArimaOrder::new(1, 0, 0)).fit(&data).unwrap();
        let summary = fitted.summary();
        assert!(summary.contains("ARIMA(1,0,0)(0,0,0)[0] intercept"));
        assert!(summary.contains("ar.L1"));
        assert!(summary.contains("AIC"));
    }
}
