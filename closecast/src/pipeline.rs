//! End-to-end forecasting run
//!
//! Load, split, estimate differencing, select a model, evaluate it
//! walk-forward, forecast ahead, reconcile the ledger and render charts.

use crate::charts::{forecast_chart, future_forecast_chart, lag_plot_chart, ChartRenderer, JsonChartRenderer};
use crate::config::PipelineConfig;
use crate::data::{DataLoader, PriceSeries};
use crate::error::Result;
use crate::future::{existing_with_forecast, forecast_business_days, CombinedRow, ForecastRecord};
use crate::ledger::{ForecastLedger, MergeSummary};
use crate::metrics::ForecastMetrics;
use crate::models::arima::ArimaOrder;
use crate::models::selection::AutoArima;
use crate::models::FittedModel;
use crate::stationarity::{estimate_differencing, DifferencingEstimate};
use crate::walk_forward::{walk_forward, WalkForwardResult};
use std::path::PathBuf;
use tracing::info;

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub observations: usize,
    pub train_len: usize,
    pub test_len: usize,
    pub differencing: DifferencingEstimate,
    pub order: ArimaOrder,
    pub model_summary: String,
    pub walk_forward: WalkForwardResult,
    pub metrics: ForecastMetrics,
    pub future: Vec<ForecastRecord>,
    /// Observed closes followed by the future forecasts
    pub combined: Vec<CombinedRow>,
    pub ledger_merge: MergeSummary,
    pub ledger_rows: usize,
    pub charts: Vec<PathBuf>,
}

/// The forecasting pipeline
#[derive(Debug)]
pub struct ForecastPipeline<R: ChartRenderer = JsonChartRenderer> {
    config: PipelineConfig,
    renderer: R,
}

impl ForecastPipeline<JsonChartRenderer> {
    /// Pipeline writing JSON chart specs to the configured output directory
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let renderer = JsonChartRenderer::new(&config.output_dir);
        Ok(Self { config, renderer })
    }
}

impl<R: ChartRenderer> ForecastPipeline<R> {
    pub fn with_renderer(config: PipelineConfig, renderer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, renderer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run on the configured input file
    pub fn run(&self) -> Result<PipelineReport> {
        info!(path = %self.config.input_path.display(), "Loading price series");
        let series = DataLoader::from_csv(&self.config.input_path)?;
        self.run_on(&series)
    }

    /// Run on an already loaded series
    pub fn run_on(&self, series: &PriceSeries) -> Result<PipelineReport> {
        let config = &self.config;
        let split = series.split(config.train_ratio)?;
        let train = split.train_values();
        let test = split.test_values();
        info!(
            observations = series.len(),
            train = train.len(),
            test = test.len(),
            "Split series"
        );

        let mut charts = vec![self.renderer.render(&lag_plot_chart(series, config.lag_plot_lags))?];

        let differencing = estimate_differencing(&train, &config.stationarity)?;
        info!(
            kpss = differencing.kpss,
            adf = differencing.adf,
            "Estimated differencing value: {}",
            differencing.n_diffs
        );

        let selection = AutoArima::new(config.selection.clone())?.fit(&train, differencing.n_diffs)?;
        let mut model = selection.model;
        model.set_confidence_level(config.confidence_level)?;
        let order = *model.order();

        let evaluation = walk_forward(&mut model, &test)?;
        let metrics = ForecastMetrics::evaluate(&test, &evaluation.forecasts)?;
        info!(
            mae = metrics.mae,
            mape = metrics.mape,
            rmse = metrics.rmse,
            "Walk-forward evaluation complete"
        );
        charts.push(self.renderer.render(&forecast_chart(
            &train,
            &evaluation.forecasts,
            &test,
            &evaluation.intervals,
        )?)?);

        let future = forecast_business_days(&model, series, config.horizon)?;
        let combined = existing_with_forecast(series, &future);
        info!(horizon = future.len(), "Forecast future business days");

        let mut ledger = ForecastLedger::load(&config.ledger_path)?;
        let ledger_merge = ledger.merge(series, &future);
        ledger.save(&config.ledger_path)?;
        info!(
            appended = ledger_merge.appended,
            backfilled = ledger_merge.backfilled,
            "Updated forecast ledger"
        );

        charts.push(self.renderer.render(&future_forecast_chart(&future))?);

        Ok(PipelineReport {
            observations: series.len(),
            train_len: train.len(),
            test_len: test.len(),
            differencing,
            order,
            model_summary: model.summary(),
            walk_forward: evaluation,
            metrics,
            future,
            combined,
            ledger_merge,
            ledger_rows: ledger.len(),
            charts,
        })
    }
}
