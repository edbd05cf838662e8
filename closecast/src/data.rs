//! Price series loading and chronological splitting

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Date formats accepted in input files. ISO comes first because it is
/// unambiguous; the rest are day-first. Two-digit years must precede `%Y`,
/// which would otherwise read "24" as year 24.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parse a calendar date, reading ambiguous forms day-first
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    // Tolerate a time suffix such as "2024-01-02 00:00:00"
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| ForecastError::Parse(format!("unrecognised date '{}'", raw)))
}

/// One observation of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices keyed by unique, ascending dates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

/// Contiguous train/test partition of a [`PriceSeries`]
#[derive(Debug, Clone, Copy)]
pub struct TrainTestSplit<'a> {
    pub train: &'a [PricePoint],
    pub test: &'a [PricePoint],
}

impl TrainTestSplit<'_> {
    /// Closing prices of the training slice
    pub fn train_values(&self) -> Vec<f64> {
        self.train.iter().map(|p| p.close).collect()
    }

    /// Closing prices of the held-out slice
    pub fn test_values(&self) -> Vec<f64> {
        self.test.iter().map(|p| p.close).collect()
    }

    /// Dates of the held-out slice
    pub fn test_dates(&self) -> Vec<NaiveDate> {
        self.test.iter().map(|p| p.date).collect()
    }
}

impl PriceSeries {
    /// Build a series, sorting by date. Duplicate dates and non-finite prices
    /// are rejected.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::Parse(format!(
                "non-finite close price on {}",
                bad.date
            )));
        }
        points.sort_by_key(|p| p.date);
        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::Parse(format!(
                "duplicate date {} in price series",
                pair[0].date
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from parallel date and price vectors
    pub fn from_parts(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Dates length ({}) doesn't match prices length ({})",
                dates.len(),
                closes.len()
            )));
        }
        Self::new(
            dates
                .into_iter()
                .zip(closes)
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        )
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Close price recorded for `date`, if any
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].close)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Split chronologically at `floor(train_ratio * len)`
    pub fn split(&self, train_ratio: f64) -> Result<TrainTestSplit<'_>> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train ratio must be in (0, 1), got {}",
                train_ratio
            )));
        }
        let cut = (self.points.len() as f64 * train_ratio).floor() as usize;
        if cut == 0 || cut >= self.points.len() {
            return Err(ForecastError::InsufficientData(format!(
                "{} observations cannot be split into non-empty train and test sets at ratio {}",
                self.points.len(),
                train_ratio
            )));
        }
        let (train, test) = self.points.split_at(cut);
        Ok(TrainTestSplit { train, test })
    }
}

/// Data loader for price series files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price series from a CSV file with a date and a close column
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract a price series from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<PriceSeries> {
        let time_column = Self::detect_time_column(df)?;
        let close_column = Self::detect_close_column(df)?;

        let dates = df.column(&time_column)?.cast(&DataType::Utf8)?;
        let closes = df.column(&close_column)?.cast(&DataType::Float64)?;

        let mut points = Vec::with_capacity(df.height());
        for (row, (raw_date, close)) in dates.utf8()?.into_iter().zip(closes.f64()?.into_iter()).enumerate() {
            let raw_date = raw_date.ok_or_else(|| {
                ForecastError::Parse(format!("row {}: missing {}", row + 1, time_column))
            })?;
            let close = close.ok_or_else(|| {
                ForecastError::Parse(format!(
                    "row {}: missing or non-numeric {}",
                    row + 1,
                    close_column
                ))
            })?;
            points.push(PricePoint {
                date: parse_date(raw_date)?,
                close,
            });
        }

        PriceSeries::new(points)
    }

    /// Detect the date column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date") || lower_name.contains("time") {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::Parse(
            "No date column found in data".to_string(),
        ))
    }

    /// Detect the close price column, preferring an exact `Close`
    fn detect_close_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        if let Some(name) = column_names.iter().find(|n| n.eq_ignore_ascii_case("close")) {
            return Ok(name.to_string());
        }
        if let Some(name) = column_names
            .iter()
            .find(|n| n.to_lowercase().contains("close") && !n.to_lowercase().contains("adj"))
        {
            return Ok(name.to_string());
        }

        Err(ForecastError::Parse(
            "No close price column found in data".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_reads_day_first() {
        assert_eq!(parse_date("02/01/2024").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date("02/01/24").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date("31/12/99").unwrap(), day(1999, 12, 31));
        assert_eq!(parse_date("31-12-2023").unwrap(), day(2023, 12, 31));
        assert_eq!(parse_date("2024-01-02").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date("2024-01-02 00:00:00").unwrap(), day(2024, 1, 2));
        assert!(matches!(parse_date("yesterday"), Err(ForecastError::Parse(_))));
    }

    #[test]
    fn new_sorts_and_rejects_duplicates() {
        let series = PriceSeries::from_parts(
            vec![day(2024, 1, 3), day(2024, 1, 1), day(2024, 1, 2)],
            vec![3.0, 1.0, 2.0],
        )
        .unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);

        let duplicate = PriceSeries::from_parts(vec![day(2024, 1, 1), day(2024, 1, 1)], vec![1.0, 2.0]);
        assert!(matches!(duplicate, Err(ForecastError::Parse(_))));
    }

    #[test]
    fn close_on_finds_known_dates() {
        let series =
            PriceSeries::from_parts(vec![day(2024, 1, 1), day(2024, 1, 2)], vec![1.0, 2.0]).unwrap();
        assert_eq!(series.close_on(day(2024, 1, 2)), Some(2.0));
        assert_eq!(series.close_on(day(2024, 1, 5)), None);
    }

    #[test]
    fn split_of_tiny_series_is_insufficient() {
        let series = PriceSeries::from_parts(vec![day(2024, 1, 1)], vec![1.0]).unwrap();
        assert!(matches!(
            series.split(0.65),
            Err(ForecastError::InsufficientData(_))
        ));
    }
}
