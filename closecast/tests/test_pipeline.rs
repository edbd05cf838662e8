use chrono::{Datelike, Duration, NaiveDate, Weekday};
use closecast::config::PipelineConfig;
use closecast::ledger::ForecastLedger;
use closecast::models::selection::SelectionConfig;
use closecast::ForecastPipeline;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

/// Writes a seeded random walk over consecutive business days, ending on a
/// Friday, with day-first dates
fn write_price_history(path: &Path, n: usize) -> NaiveDate {
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.8).unwrap();

    let mut dates = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    while dates.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date -= Duration::days(1);
    }
    dates.reverse();

    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "Date,Open,Close").unwrap();
    let mut level = 250.0;
    for date in &dates {
        level += 0.05 + noise.sample(&mut rng);
        writeln!(file, "{},{:.2},{:.4}", date.format("%d/%m/%Y"), level - 0.3, level).unwrap();
    }
    *dates.last().unwrap()
}

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        input_path: dir.join("history.csv"),
        ledger_path: dir.join("out").join("forecast.csv"),
        output_dir: dir.join("out"),
        selection: SelectionConfig {
            trace: false,
            ..SelectionConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn test_full_forecast_workflow() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let last_date = write_price_history(&config.input_path, 120);

    let pipeline = ForecastPipeline::new(config.clone()).unwrap();
    let report = pipeline.run().unwrap();

    assert_eq!(report.observations, 120);
    assert_eq!(report.train_len, 78);
    assert_eq!(report.train_len + report.test_len, 120);
    assert!(report.differencing.n_diffs <= 6);
    assert_eq!(
        report.differencing.n_diffs,
        report.differencing.kpss.max(report.differencing.adf)
    );

    assert_eq!(report.walk_forward.forecasts.len(), report.test_len);
    assert_eq!(report.walk_forward.intervals.len(), report.test_len);
    assert!(report.metrics.mae.is_finite() && report.metrics.mae >= 0.0);
    assert!(report.model_summary.contains("ARIMA("));

    // Ten business days after Friday 2024-06-28
    assert_eq!(report.future.len(), 10);
    assert_eq!(report.future[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    assert!(report.future[0].date > last_date);
    assert!(report
        .future
        .iter()
        .all(|r| !matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun)));
    assert_eq!(report.combined.len(), 130);

    let ledger = ForecastLedger::load(&config.ledger_path).unwrap();
    assert_eq!(ledger.len(), 10);
    assert_eq!(report.ledger_rows, 10);

    assert_eq!(report.charts.len(), 3);
    for chart in &report.charts {
        assert!(chart.exists(), "{} missing", chart.display());
    }
    assert!(config.output_dir.join("autocorrelation.json").exists());
    assert!(config.output_dir.join("forecast_vs_actual.json").exists());
    assert!(config.output_dir.join("10_day_forecast.json").exists());
}

#[test]
fn test_rerun_keeps_existing_forecasts() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    write_price_history(&config.input_path, 90);

    let pipeline = ForecastPipeline::new(config.clone()).unwrap();
    pipeline.run().unwrap();
    let first = ForecastLedger::load(&config.ledger_path).unwrap();

    let second_report = pipeline.run().unwrap();
    let second = ForecastLedger::load(&config.ledger_path).unwrap();

    assert_eq!(second_report.ledger_merge.appended, 0);
    assert_eq!(first, second);
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempdir().unwrap();
    let pipeline = ForecastPipeline::new(config_in(dir.path())).unwrap();
    let result = pipeline.run();
    assert!(matches!(result, Err(closecast::ForecastError::FileNotFound(_))));
}

#[test]
fn test_too_short_series_is_insufficient() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    write_price_history(&config.input_path, 1);

    let result = ForecastPipeline::new(config).unwrap().run();
    assert!(matches!(result, Err(closecast::ForecastError::InsufficientData(_))));
}
