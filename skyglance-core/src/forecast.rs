//! Reshaping of the forecast series into the daily and hourly views.
//!
//! Both derivations are single passes over the series and keep the series'
//! order. Neither averages anything: the daily view is represented by the
//! first sample of each date.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::model::ForecastSample;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// One card of the daily view.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyEntry<'a> {
    pub date: NaiveDate,
    pub weekday: &'static str,
    /// First sample of `date` in the series.
    pub representative: &'a ForecastSample,
}

/// Distinct calendar dates of the series, in first-seen order.
pub fn unique_dates(series: &[ForecastSample]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = Vec::new();
    for sample in series {
        let date = sample.timestamp.date();
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

/// One entry per distinct date, keyed to the first sample of that date.
pub fn daily_view(series: &[ForecastSample]) -> Vec<DailyEntry<'_>> {
    unique_dates(series)
        .into_iter()
        .filter_map(|date| {
            series.iter().find(|s| s.timestamp.date() == date).map(|representative| DailyEntry {
                date,
                weekday: weekday_name(date),
                representative,
            })
        })
        .collect()
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    const NAMES: [&str; 7] =
        ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
    NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Whole hours from `reference` to `timestamp`, rounded up.
///
/// A sample six minutes away is one hour ahead; a sample exactly at the
/// reference is zero hours ahead.
pub fn hours_ahead(timestamp: NaiveDateTime, reference: NaiveDateTime) -> i64 {
    let millis = (timestamp - reference).num_milliseconds();
    let hours = millis / MILLIS_PER_HOUR;
    // Truncation toward zero is already the ceiling for negative values.
    if millis % MILLIS_PER_HOUR > 0 { hours + 1 } else { hours }
}

/// Samples whose hours-ahead of `reference` lies in `1..=horizon`.
pub fn hourly_window(
    series: &[ForecastSample],
    reference: NaiveDateTime,
    horizon: u32,
) -> Vec<ForecastSample> {
    let horizon = i64::from(horizon);
    series
        .iter()
        .filter(|s| (1..=horizon).contains(&hours_ahead(s.timestamp, reference)))
        .cloned()
        .collect()
}
