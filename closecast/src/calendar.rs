//! Business-day calendar used to date future forecasts

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Whether `date` falls Monday to Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first `count` business days strictly after `last_date`.
///
/// Counting starts on the calendar day after `last_date`; a weekend start
/// rolls forward to Monday. Holidays are not modelled.
pub fn business_days_after(last_date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = last_date;

    while dates.len() < count {
        current += Duration::days(1);
        if is_business_day(current) {
            dates.push(current);
        }
    }

    dates
}
