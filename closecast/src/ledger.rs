//! Persisted forecast ledger
//!
//! One row per date ever forecast, carrying the forecast, the closing price
//! once it is known and their difference. The ledger is read at the start of
//! a run, reconciled with the latest prices and forecasts, and rewritten in
//! full.

use crate::data::{parse_date, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::future::ForecastRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// On-disk row layout
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Closing Price")]
    closing_price: Option<f64>,
    #[serde(rename = "Forecasted Closing Price")]
    forecasted_closing_price: Option<f64>,
    #[serde(rename = "Difference")]
    difference: Option<f64>,
}

/// A ledger row; absent values are `None`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LedgerEntry {
    pub closing_price: Option<f64>,
    pub forecasted_closing_price: Option<f64>,
    pub difference: Option<f64>,
}

impl LedgerEntry {
    fn recompute_difference(&mut self) {
        self.difference = match (self.forecasted_closing_price, self.closing_price) {
            (Some(forecast), Some(close)) => Some(forecast - close),
            _ => None,
        };
    }
}

/// Counts of what a merge changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MergeSummary {
    pub appended: usize,
    pub backfilled: usize,
}

/// Forecast history keyed by date, kept sorted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastLedger {
    rows: BTreeMap<NaiveDate, LedgerEntry>,
}

/// Finite values only; `NaN` cells read back as absent
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl ForecastLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a ledger from CSV. A missing file is an empty ledger.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "No existing forecast ledger; starting a new one");
            return Ok(Self::new());
        }

        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let mut ledger = Self::new();

        for (line, result) in reader.deserialize::<LedgerRecord>().enumerate() {
            let record = result?;
            let date = parse_date(&record.date)?;
            let entry = LedgerEntry {
                closing_price: finite(record.closing_price),
                forecasted_closing_price: finite(record.forecasted_closing_price),
                difference: finite(record.difference),
            };
            if ledger.rows.insert(date, entry).is_some() {
                return Err(ForecastError::Parse(format!(
                    "ledger row {}: duplicate date {}",
                    line + 2,
                    date
                )));
            }
        }

        info!(rows = ledger.len(), "Loaded forecast ledger");
        Ok(ledger)
    }

    /// Overwrite `path` with the full ledger, dates written as ISO
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_writer(Vec::new());
        for (date, entry) in &self.rows {
            writer.serialize(LedgerRecord {
                date: date.format("%Y-%m-%d").to_string(),
                closing_price: entry.closing_price,
                forecasted_closing_price: entry.forecasted_closing_price,
                difference: entry.difference,
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ForecastError::write_failure(path, e.into_error()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ForecastError::write_failure(parent, e))?;
        }
        fs::write(path, bytes).map_err(|e| ForecastError::write_failure(path, e))?;

        info!(path = %path.display(), rows = self.len(), "Saved forecast ledger");
        Ok(())
    }

    pub fn get(&self, date: NaiveDate) -> Option<&LedgerEntry> {
        self.rows.get(&date)
    }

    /// Rows in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &LedgerEntry)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert or replace a row as given
    #[cfg(test)]
    pub(crate) fn insert(&mut self, date: NaiveDate, entry: LedgerEntry) {
        self.rows.insert(date, entry);
    }

    /// Add forecast dates not yet present; an existing forecast is kept
    pub fn append_forecasts(&mut self, records: &[ForecastRecord]) -> usize {
        let mut appended = 0;
        for record in records {
            let entry = self.rows.entry(record.date).or_default();
            if entry.forecasted_closing_price.is_none() {
                entry.forecasted_closing_price = Some(record.forecast);
                appended += 1;
            }
        }
        appended
    }

    /// Fill missing closing prices from `series`; a known price is never replaced
    pub fn backfill_closing(&mut self, series: &PriceSeries) -> usize {
        let mut filled = 0;
        for (date, entry) in self.rows.iter_mut() {
            if entry.closing_price.is_some() {
                continue;
            }
            if let Some(close) = series.close_on(*date) {
                entry.closing_price = Some(close);
                filled += 1;
            }
        }
        filled
    }

    /// Difference = forecast - closing price on every row
    pub fn recompute_differences(&mut self) {
        self.rows.values_mut().for_each(LedgerEntry::recompute_difference);
    }

    /// Append new forecasts, backfill realised prices and refresh differences
    pub fn merge(&mut self, series: &PriceSeries, records: &[ForecastRecord]) -> MergeSummary {
        let appended = self.append_forecasts(records);
        let backfilled = self.backfill_closing(series);
        self.recompute_differences();
        MergeSummary {
            appended,
            backfilled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> PriceSeries {
        PriceSeries::from_parts(
            points.iter().map(|p| p.0).collect(),
            points.iter().map(|p| p.1).collect(),
        )
        .unwrap()
    }

    fn settled_ledger(close: f64) -> ForecastLedger {
        let mut ledger = ForecastLedger::new();
        ledger.insert(
            day(1, 2),
            LedgerEntry {
                closing_price: Some(close),
                forecasted_closing_price: Some(101.5),
                difference: None,
            },
        );
        ledger
    }

    #[test]
    fn settled_row_is_unchanged() {
        let mut ledger = settled_ledger(100.0);
        ledger.merge(&series(&[(day(1, 2), 100.0)]), &[]);

        let entry = ledger.get(day(1, 2)).unwrap();
        assert_eq!(entry.closing_price, Some(100.0));
        assert_eq!(entry.forecasted_closing_price, Some(101.5));
        assert_eq!(entry.difference, Some(1.5));
    }

    #[test]
    fn known_close_is_not_overwritten() {
        let mut ledger = settled_ledger(100.0);
        let summary = ledger.merge(&series(&[(day(1, 2), 97.0)]), &[]);

        assert_eq!(summary.backfilled, 0);
        assert_eq!(ledger.get(day(1, 2)).unwrap().closing_price, Some(100.0));
    }

    #[test]
    fn missing_close_is_backfilled() {
        let mut ledger = ForecastLedger::new();
        ledger.insert(
            day(1, 3),
            LedgerEntry {
                forecasted_closing_price: Some(102.0),
                ..LedgerEntry::default()
            },
        );
        ledger.insert(
            day(1, 4),
            LedgerEntry {
                forecasted_closing_price: Some(103.0),
                ..LedgerEntry::default()
            },
        );

        let summary = ledger.merge(&series(&[(day(1, 3), 100.0)]), &[]);

        assert_eq!(summary.backfilled, 1);
        assert_eq!(ledger.get(day(1, 3)).unwrap().difference, Some(2.0));
        // Not yet realised
        assert_eq!(ledger.get(day(1, 4)).unwrap().closing_price, None);
        assert_eq!(ledger.get(day(1, 4)).unwrap().difference, None);
    }

    #[test]
    fn merge_twice_is_idempotent() {
        let prices = series(&[(day(1, 2), 100.0), (day(1, 3), 99.0)]);
        let records = [ForecastRecord {
            date: day(1, 4),
            forecast: 98.5,
            interval: (97.0, 100.0),
        }];
        let mut ledger = settled_ledger(100.0);

        ledger.merge(&prices, &records);
        let once = ledger.clone();
        let summary = ledger.merge(&prices, &records);

        assert_eq!(ledger, once);
        assert_eq!(summary, MergeSummary::default());
    }

    #[test]
    fn existing_forecast_wins_over_new_one() {
        let mut ledger = settled_ledger(100.0);
        let records = [ForecastRecord {
            date: day(1, 2),
            forecast: 120.0,
            interval: (110.0, 130.0),
        }];
        assert_eq!(ledger.append_forecasts(&records), 0);
        assert_eq!(ledger.get(day(1, 2)).unwrap().forecasted_closing_price, Some(101.5));
    }

    #[test]
    fn rows_iterate_in_date_order() {
        let mut ledger = ForecastLedger::new();
        let records: Vec<ForecastRecord> = [day(2, 1), day(1, 5), day(1, 20)]
            .iter()
            .map(|&date| ForecastRecord {
                date,
                forecast: 1.0,
                interval: (0.0, 2.0),
            })
            .collect();
        ledger.append_forecasts(&records);

        let dates: Vec<NaiveDate> = ledger.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, vec![day(1, 5), day(1, 20), day(2, 1)]);
    }
}
