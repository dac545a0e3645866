//! Temporal bucketing rules
//!
//! All aggregation and animation runs on (date, hour) buckets derived in the
//! record's own UTC offset. Client associations use a half-up rounded hour to
//! pull sparse per-device pings onto common hourly slots; the peak-usage view
//! of access-point load keeps the truncated snapshot hour. The asymmetry is
//! deliberate and mirrors the source data conventions.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::Serialize;
use std::fmt;

/// One (date, hour) aggregation slot.
///
/// `Ord` and `Display` agree: the canonical `YYYY-MM-DDTHH:00:00` string is
/// zero-padded, so lexicographic order of the rendered form is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeBucket {
    pub date: chrono::NaiveDate,
    pub hour: u32,
}

impl TimeBucket {
    pub fn new(date: chrono::NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// Canonical time-index form consumed by the animation renderer.
    pub fn canonical(&self) -> String {
        format!("{}T{:02}:00:00", self.date.format("%Y-%m-%d"), self.hour)
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Hour of day at native granularity.
pub fn truncated_hour<Tz: TimeZone>(ts: &DateTime<Tz>) -> u32 {
    ts.hour()
}

/// Half-up rounded hour: minute >= 30 advances by one, 24 wraps to 0.
///
/// The calendar date is not advanced on wrap; 23:30 lands in bucket 0 of the
/// same date, matching the observed behavior of the source dataset.
pub fn rounded_hour<Tz: TimeZone>(ts: &DateTime<Tz>) -> u32 {
    let carry = if ts.minute() >= 30 { 1 } else { 0 };
    (ts.hour() + carry) % 24
}

/// Calendar date in the timestamp's own offset.
pub fn bucket_date<Tz: TimeZone>(ts: &DateTime<Tz>) -> chrono::NaiveDate {
    ts.date_naive()
}

/// Full English weekday label, one of seven.
pub fn day_of_week<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    let label = match ts.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    label.to_string()
}
