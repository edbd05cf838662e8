//! Automatic ARIMA order selection
//!
//! The stepwise search follows Hyndman and Khandakar: fit a handful of
//! starting orders, then repeatedly move to the best neighbouring order
//! until no neighbour improves the information criterion. Every order is
//! fitted at most once. A full grid search is available when `stepwise` is
//! off.

use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, ArimaOrder, FittedArima, SeasonalOrder};
use crate::models::ForecastModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Criterion minimised by the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Aicc,
    Bic,
}

impl InformationCriterion {
    fn score(self, fitted: &FittedArima) -> f64 {
        let stats = fitted.statistics();
        match self {
            InformationCriterion::Aic => stats.aic,
            InformationCriterion::Aicc => stats.aicc,
            InformationCriterion::Bic => stats.bic,
        }
    }

    fn label(self) -> &'static str {
        match self {
            InformationCriterion::Aic => "AIC",
            InformationCriterion::Aicc => "AICc",
            InformationCriterion::Bic => "BIC",
        }
    }
}

/// Bounds and switches of the order search
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub start_p: usize,
    pub start_q: usize,
    pub max_p: usize,
    pub max_q: usize,
    /// Cap on `p + q + P + Q`; `None` leaves it unbounded
    pub max_order: Option<usize>,
    /// Allow seasonal terms; they only enter the model when `period > 1`
    pub seasonal: bool,
    /// Season length
    pub period: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    /// Greedy neighbour search instead of the full grid
    pub stepwise: bool,
    /// Maximum number of candidate fits in stepwise mode
    pub max_steps: usize,
    pub information_criterion: InformationCriterion,
    /// Log every candidate fit at info level
    pub trace: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            start_p: 2,
            start_q: 2,
            max_p: 6,
            max_q: 5,
            max_order: None,
            seasonal: true,
            period: 1,
            max_seasonal_p: 2,
            max_seasonal_q: 2,
            stepwise: true,
            max_steps: 100,
            information_criterion: InformationCriterion::Aic,
            trace: true,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.start_p > self.max_p || self.start_q > self.max_q {
            return Err(ForecastError::InvalidParameter(format!(
                "start orders ({}, {}) exceed maxima ({}, {})",
                self.start_p, self.start_q, self.max_p, self.max_q
            )));
        }
        if self.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 1".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_steps must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn seasonal_enabled(&self) -> bool {
        self.seasonal && self.period > 1
    }

    fn within_bounds(&self, order: &ArimaOrder) -> bool {
        let seasonal_ok = if self.seasonal_enabled() {
            order.seasonal.p <= self.max_seasonal_p && order.seasonal.q <= self.max_seasonal_q
        } else {
            order.seasonal.p == 0 && order.seasonal.q == 0
        };
        order.p <= self.max_p
            && order.q <= self.max_q
            && seasonal_ok
            && self.max_order.map_or(true, |cap| order.total_order() <= cap)
            && !(order.d >= 2 && order.with_intercept)
    }
}

/// One evaluated candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub order: ArimaOrder,
    /// `f64::INFINITY` when the fit failed
    pub score: f64,
    pub seconds: f64,
}

/// Winning model together with the search history
#[derive(Debug)]
pub struct Selection {
    pub model: FittedArima,
    pub criterion: InformationCriterion,
    /// Candidates in the order they were fitted
    pub candidates: Vec<Candidate>,
    pub seconds: f64,
}

/// Searches ARIMA orders for a fixed differencing order
#[derive(Debug, Clone)]
pub struct AutoArima {
    config: SelectionConfig,
}

struct SearchState<'a> {
    data: &'a [f64],
    config: &'a SelectionConfig,
    fitted: HashMap<ArimaOrder, Option<FittedArima>>,
    candidates: Vec<Candidate>,
}

impl<'a> SearchState<'a> {
    fn new(data: &'a [f64], config: &'a SelectionConfig) -> Self {
        Self {
            data,
            config,
            fitted: HashMap::new(),
            candidates: Vec::new(),
        }
    }

    /// Fit `order` unless it was already tried; returns its score
    fn evaluate(&mut self, order: ArimaOrder) -> f64 {
        if let Some(previous) = self.fitted.get(&order) {
            return previous
                .as_ref()
                .map_or(f64::INFINITY, |m| self.config.information_criterion.score(m));
        }

        let started = Instant::now();
        let result = ArimaModel::new(order).fit(self.data);
        let seconds = started.elapsed().as_secs_f64();
        let criterion = self.config.information_criterion;

        let (score, fitted) = match result {
            Ok(fitted) => {
                let score = criterion.score(&fitted);
                if score.is_finite() {
                    (score, Some(fitted))
                } else {
                    (f64::INFINITY, None)
                }
            }
            Err(e) => {
                debug!(%order, error = %e, "candidate fit failed");
                (f64::INFINITY, None)
            }
        };

        if self.config.trace {
            if score.is_finite() {
                info!("{} : {}={:.3}, Time={:.2} sec", order, criterion.label(), score, seconds);
            } else {
                info!("{} : {}=inf, Time={:.2} sec", order, criterion.label(), seconds);
            }
        }

        self.fitted.insert(order, fitted);
        self.candidates.push(Candidate {
            order,
            score,
            seconds,
        });
        score
    }

    fn attempts(&self) -> usize {
        self.candidates.len()
    }

    fn into_selection(mut self, best: ArimaOrder, started: Instant) -> Result<Selection> {
        let criterion = self.config.information_criterion;
        match self.fitted.remove(&best).flatten() {
            Some(model) => Ok(Selection {
                model,
                criterion,
                candidates: self.candidates,
                seconds: started.elapsed().as_secs_f64(),
            }),
            None => Err(ForecastError::ModelSelection(format!(
                "none of the {} candidate orders could be fitted",
                self.candidates.len()
            ))),
        }
    }
}

impl AutoArima {
    pub fn new(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Select and fit the best order for `data` differenced `d` times
    pub fn fit(&self, data: &[f64], d: usize) -> Result<Selection> {
        let started = Instant::now();
        let mut state = SearchState::new(data, &self.config);

        let best = if self.config.stepwise {
            info!("Performing stepwise search to minimize {}", self.config.information_criterion.label());
            self.stepwise(&mut state, d)
        } else {
            self.grid(&mut state, d)
        };

        let selection = match best {
            Some(order) => state.into_selection(order, started)?,
            None => {
                return Err(ForecastError::ModelSelection(format!(
                    "none of the {} candidate orders could be fitted",
                    state.attempts()
                )))
            }
        };

        info!(
            "Best model: {}  Total fit time: {:.3} seconds",
            selection.model.order(),
            selection.seconds
        );
        Ok(selection)
    }

    fn seasonal(&self, p: usize, q: usize) -> SeasonalOrder {
        if self.config.seasonal_enabled() {
            SeasonalOrder {
                p,
                q,
                period: self.config.period,
            }
        } else {
            SeasonalOrder::default()
        }
    }

    fn starting_orders(&self, d: usize) -> Vec<ArimaOrder> {
        let (sp, sq) = if self.config.seasonal_enabled() { (1, 1) } else { (0, 0) };
        let intercept = d < 2;
        let start_p = self.config.start_p.min(self.config.max_p);
        let start_q = self.config.start_q.min(self.config.max_q);

        vec![
            ArimaOrder::new(start_p, d, start_q).with_seasonal(self.seasonal(sp, sq)),
            ArimaOrder::new(0, d, 0).with_seasonal(self.seasonal(0, 0)),
            ArimaOrder::new(1, d, 0).with_seasonal(self.seasonal(sp, 0)),
            ArimaOrder::new(0, d, 1).with_seasonal(self.seasonal(0, sq)),
            ArimaOrder::new(0, d, 0)
                .with_seasonal(self.seasonal(0, 0))
                .with_intercept(false),
        ]
        .into_iter()
        .map(|order| if intercept { order } else { order.with_intercept(false) })
        .collect()
    }

    /// Orders one step away from `order`
    fn neighbours(&self, order: &ArimaOrder) -> Vec<ArimaOrder> {
        let mut out = Vec::new();
        let step = |value: usize, delta: i64| -> Option<usize> {
            let next = value as i64 + delta;
            (next >= 0).then_some(next as usize)
        };

        if self.config.seasonal_enabled() {
            for (dp, dq) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1)] {
                if let (Some(sp), Some(sq)) = (step(order.seasonal.p, dp), step(order.seasonal.q, dq)) {
                    let mut next = *order;
                    next.seasonal.p = sp;
                    next.seasonal.q = sq;
                    out.push(next);
                }
            }
        }

        for (dp, dq) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1), (-1, 1), (1, -1)] {
            if let (Some(p), Some(q)) = (step(order.p, dp), step(order.q, dq)) {
                let mut next = *order;
                next.p = p;
                next.q = q;
                out.push(next);
            }
        }

        if order.d < 2 {
            out.push(order.with_intercept(!order.with_intercept));
        }

        out.retain(|o| self.config.within_bounds(o));
        out
    }

    fn stepwise(&self, state: &mut SearchState<'_>, d: usize) -> Option<ArimaOrder> {
        let mut best: Option<(ArimaOrder, f64)> = None;

        for order in self.starting_orders(d) {
            if !self.config.within_bounds(&order) {
                continue;
            }
            let score = state.evaluate(order);
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((order, score));
            }
        }

        'search: loop {
            let (current, current_score) = best?;
            for neighbour in self.neighbours(&current) {
                if state.attempts() >= self.config.max_steps {
                    debug!(max_steps = self.config.max_steps, "stepwise search hit step limit");
                    break 'search;
                }
                let score = state.evaluate(neighbour);
                if score < current_score {
                    best = Some((neighbour, score));
                    continue 'search;
                }
            }
            break;
        }

        best.filter(|(_, score)| score.is_finite()).map(|(order, _)| order)
    }

    fn grid(&self, state: &mut SearchState<'_>, d: usize) -> Option<ArimaOrder> {
        let (max_sp, max_sq) = if self.config.seasonal_enabled() {
            (self.config.max_seasonal_p, self.config.max_seasonal_q)
        } else {
            (0, 0)
        };
        let intercepts: &[bool] = if d < 2 { &[true, false] } else { &[false] };

        let mut best: Option<(ArimaOrder, f64)> = None;
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for sp in 0..=max_sp {
                    for sq in 0..=max_sq {
                        for &intercept in intercepts {
                            let order = ArimaOrder::new(p, d, q)
                                .with_seasonal(self.seasonal(sp, sq))
                                .with_intercept(intercept);
                            if !self.config.within_bounds(&order) {
                                continue;
                            }
                            let score = state.evaluate(order);
                            if score.is_finite() && best.map_or(true, |(_, s)| score < s) {
                                best = Some((order, score));
                            }
                        }
                    }
                }
            }
        }
        best.map(|(order, _)| order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use crate::models::FittedModel;

    fn ar1_series(phi: f64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(17);
        let noise = Normal::new(0.0, 0.1).unwrap();
        let mut data = vec![0.0];
        for i in 1..n {
            data.push(phi * data[i - 1] + noise.sample(&mut rng));
        }
        data
    }

    fn quiet(config: SelectionConfig) -> SelectionConfig {
        SelectionConfig {
            trace: false,
            ..config
        }
    }

    #[test]
    fn stepwise_finds_a_finite_model() {
        let data = ar1_series(0.6, 200);
        let auto = AutoArima::new(quiet(SelectionConfig::default())).unwrap();
        let selection = auto.fit(&data, 0).unwrap();

        assert!(selection.model.statistics().aic.is_finite());
        assert!(selection.model.order().p <= 6);
        assert!(selection.candidates.len() <= 100);
        assert!(selection.model.forecast(1).unwrap().values()[0].is_finite());
    }

    #[test]
    fn each_order_is_fitted_once() {
        let data = ar1_series(0.4, 150);
        let auto = AutoArima::new(quiet(SelectionConfig::default())).unwrap();
        let selection = auto.fit(&data, 1).unwrap();

        let mut seen = std::collections::HashSet::new();
        for candidate in &selection.candidates {
            assert!(seen.insert(candidate.order), "{} fitted twice", candidate.order);
        }
    }

    #[test]
    fn selected_score_is_minimal_among_candidates() {
        let data = ar1_series(0.5, 150);
        let auto = AutoArima::new(quiet(SelectionConfig::default())).unwrap();
        let selection = auto.fit(&data, 0).unwrap();

        let best = selection.criterion.score(&selection.model);
        assert!(selection.candidates.iter().all(|c| c.score >= best - 1e-9));
    }

    #[test]
    fn no_intercept_when_twice_differenced() {
        let data: Vec<f64> = (0..120).map(|i| (i * i) as f64 * 0.01 + ((i * 31) % 11) as f64 * 0.1).collect();
        let auto = AutoArima::new(quiet(SelectionConfig::default())).unwrap();
        let selection = auto.fit(&data, 2).unwrap();

        assert!(selection.candidates.iter().all(|c| !c.order.with_intercept));
    }

    #[test]
    fn max_order_caps_candidates() {
        let data = ar1_series(0.5, 150);
        let config = quiet(SelectionConfig {
            max_order: Some(2),
            ..SelectionConfig::default()
        });
        let selection = AutoArima::new(config).unwrap().fit(&data, 0).unwrap();
        assert!(selection.candidates.iter().all(|c| c.order.total_order() <= 2));
    }

    #[test]
    fn grid_search_covers_bounds() {
        let data = ar1_series(0.5, 120);
        let config = quiet(SelectionConfig {
            stepwise: false,
            start_p: 1,
            start_q: 1,
            max_p: 1,
            max_q: 1,
            ..SelectionConfig::default()
        });
        let selection = AutoArima::new(config).unwrap().fit(&data, 0).unwrap();
        // (p, q) in {0,1}^2 with and without intercept
        assert_eq!(selection.candidates.len(), 8);
    }

    #[test]
    fn too_short_series_fails_selection() {
        let auto = AutoArima::new(quiet(SelectionConfig::default())).unwrap();
        let result = auto.fit(&[1.0, 2.0], 1);
        assert!(matches!(result, Err(ForecastError::ModelSelection(_))));
    }

    #[test]
    fn rejects_start_above_max() {
        let config = SelectionConfig {
            start_p: 3,
            max_p: 2,
            ..SelectionConfig::default()
        };
        assert!(AutoArima::new(config).is_err());
    }
}
