//! Core data models for the WiFi heatmap pipeline

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw access-point record as dumped by the network controller.
///
/// Snapshot records are loosely typed on the wire: numeric fields
/// occasionally arrive as strings and most fields can be absent.
/// Coercion happens once here, at the ingestion boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct RawApRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    /// Connected client count; missing or non-numeric values count as zero
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub client_count: Option<f64>,
    /// Unix epoch seconds of the controller's last status update
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub last_modified: Option<f64>,
}

/// Raw client-association record as dumped by the network controller.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClientRecord {
    #[serde(default)]
    pub associated_device_name: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub health: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub signal_db: Option<f64>,
    /// Unix epoch milliseconds of the client's last association
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub last_connection_time: Option<f64>,
}

/// Normalized access-point record with a resolved capture time.
#[derive(Debug, Clone, Serialize)]
pub struct ApObservation {
    pub name: Option<String>,
    pub serial: Option<String>,
    pub client_count: u32,
    pub capture_time: DateTime<Utc>,
}

/// Per-file access-point rollup for the peak-usage view.
///
/// The capture time comes from the encoded filename, not from any record,
/// so the rollup survives even when individual records lack timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct ApSnapshot {
    pub file_name: String,
    pub capture_time: DateTime<FixedOffset>,
    pub date: NaiveDate,
    pub day_of_week: String,
    /// Truncated hour of the snapshot capture, native granularity
    pub hour: u32,
    pub total_clients: u64,
}

/// Normalized client-association record with derived time buckets.
#[derive(Debug, Clone, Serialize)]
pub struct ClientObservation {
    pub associated_ap_name: Option<String>,
    pub health: Option<f64>,
    pub signal_db: Option<f64>,
    pub connection_time: DateTime<Utc>,
    /// Half-up rounded hour (minute >= 30 advances, 23 wraps to 0)
    pub rounded_hour: u32,
    pub date: NaiveDate,
    pub day_of_week: String,
}

/// Mean client metrics for one (date, hour, access point) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMetric {
    pub date: NaiveDate,
    pub hour: u32,
    pub ap_name: String,
    pub avg_health: f64,
    pub avg_signal_db: f64,
    pub sample_count: u64,
}

/// Accept a JSON number, a numeric string, or anything else as `None`.
///
/// Matches the source data's "coerce or null" convention: a record is never
/// rejected because one numeric field failed to parse.
fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Coerce a JSON value to `f64`, returning `None` on failure.
pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
