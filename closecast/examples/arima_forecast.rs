use chrono::{Duration, NaiveDate};
use closecast::calendar::business_days_after;
use closecast::config::StationarityConfig;
use closecast::models::selection::{AutoArima, SelectionConfig};
use closecast::stationarity::estimate_differencing;
use closecast::walk_forward::walk_forward;
use closecast::{FittedModel, ForecastMetrics, PriceSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build a drifting, gently oscillating price series
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).ok_or("invalid start date")?;
    let dates: Vec<NaiveDate> = (0..200).map(|i| start + Duration::days(i)).collect();
    let closes: Vec<f64> = (0..200)
        .map(|i| 100.0 + 0.2 * i as f64 + 3.0 * (i as f64 / 9.0).sin() + ((i * 7919) % 13) as f64 * 0.05)
        .collect();
    let series = PriceSeries::from_parts(dates, closes)?;

    let split = series.split(0.65)?;
    let train = split.train_values();
    let test = split.test_values();
    println!("Training on {} points, testing on {}", train.len(), test.len());

    let differencing = estimate_differencing(&train, &StationarityConfig::default())?;
    println!("Estimated differencing value: {}", differencing.n_diffs);

    let selection = AutoArima::new(SelectionConfig::default())?.fit(&train, differencing.n_diffs)?;
    let mut model = selection.model;
    println!("Selected {} after {} candidates", model.name(), selection.candidates.len());

    let evaluation = walk_forward(&mut model, &test)?;
    println!("{}", ForecastMetrics::evaluate(&test, &evaluation.forecasts)?);

    let last_date = series.last_date().ok_or("empty series")?;
    let forecast = model.forecast(5)?;
    for (date, value) in business_days_after(last_date, 5).iter().zip(forecast.values()) {
        println!("{}: {:.2}", date, value);
    }

    Ok(())
}
