//! Filtered dataset export
//!
//! Produces the lightweight JSON documents consumed by notebooks and the
//! static frontend: a combined blob with `aps`, `clients` and a `meta`
//! block recording input file counts, plus standalone per-kind slices.

use crate::geo::{GeoIndex, GeoLocation};
use crate::models::{ApObservation, ClientObservation};
use chrono::{Datelike, SecondsFormat};
use serde::Serialize;

/// Geolocated, time-bucketed access-point export row.
#[derive(Debug, Clone, Serialize)]
pub struct ApExportRecord {
    pub name: Option<String>,
    pub serial: Option<String>,
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub client_count: u32,
    pub location: Option<GeoLocation>,
}

/// Time-bucketed client export row.
#[derive(Debug, Clone, Serialize)]
pub struct ClientExportRecord {
    pub timestamp: String,
    /// Half-up rounded hour
    pub hour: u32,
    pub day_of_week: String,
    pub date: String,
    pub day: u32,
    pub health: Option<f64>,
    pub signal_db: Option<f64>,
    pub associated_device_name: Option<String>,
}

/// Input file counts for the combined document's metadata block.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetMeta {
    pub aps_files: usize,
    pub client_files: usize,
}

/// The combined export document.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedDataset {
    pub aps: Vec<ApExportRecord>,
    pub clients: Vec<ClientExportRecord>,
    pub meta: DatasetMeta,
}

/// Convert AP observations to export rows, joining locations by name.
///
/// APs without a geolocation match export with `location: null`; they are
/// retained here because the export is not a spatial product.
pub fn ap_export_records(observations: &[ApObservation], index: &GeoIndex) -> Vec<ApExportRecord> {
    observations
        .iter()
        .map(|obs| ApExportRecord {
            name: obs.name.clone(),
            serial: obs.serial.clone(),
            timestamp: obs.capture_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            date: obs.capture_time.format("%Y-%m-%d").to_string(),
            time: obs.capture_time.format("%H:%M:%S").to_string(),
            client_count: obs.client_count,
            location: obs
                .name
                .as_deref()
                .and_then(|name| index.get(name))
                .cloned(),
        })
        .collect()
}

/// Convert client observations to export rows.
pub fn client_export_records(observations: &[ClientObservation]) -> Vec<ClientExportRecord> {
    observations
        .iter()
        .map(|obs| ClientExportRecord {
            timestamp: obs
                .connection_time
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            hour: obs.rounded_hour,
            day_of_week: obs.day_of_week.clone(),
            date: obs.date.format("%Y-%m-%d").to_string(),
            day: obs.date.day(),
            health: obs.health,
            signal_db: obs.signal_db,
            associated_device_name: obs.associated_ap_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_ap_export_joins_location_by_name() {
        let index = GeoIndex::from_feature_collection(
            r#"{"features": [{"properties": {"USER_NOM_A": "AP-C1-01", "USER_EDIFI": "Ciencies", "X": 425000.0, "Y": 4594000.0}}]}"#,
        )
        .unwrap();

        let observations = vec![
            ApObservation {
                name: Some("AP-C1-01".to_string()),
                serial: Some("SER123".to_string()),
                client_count: 4,
                capture_time: DateTime::from_timestamp_millis(1743669901000).unwrap(),
            },
            ApObservation {
                name: Some("AP-UNKNOWN".to_string()),
                serial: None,
                client_count: 2,
                capture_time: DateTime::from_timestamp_millis(1743669901000).unwrap(),
            },
        ];

        let rows = ap_export_records(&observations, &index);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].location.as_ref().unwrap().building_name.as_deref(),
            Some("Ciencies")
        );
        assert!(rows[1].location.is_none());
        assert_eq!(rows[0].timestamp, "2025-04-03T08:45:01Z");
        assert_eq!(rows[0].date, "2025-04-03");
        assert_eq!(rows[0].time, "08:45:01");
    }

    #[test]
    fn test_client_export_keeps_derived_buckets() {
        let ts = DateTime::from_timestamp_millis(1743669901000).unwrap();
        let observations = vec![ClientObservation {
            associated_ap_name: Some("AP-C1-01".to_string()),
            health: Some(90.0),
            signal_db: None,
            connection_time: ts,
            rounded_hour: 9,
            date: ts.date_naive(),
            day_of_week: "Thursday".to_string(),
        }];

        let rows = client_export_records(&observations);

        assert_eq!(rows[0].hour, 9);
        assert_eq!(rows[0].day, 3);
        assert_eq!(rows[0].day_of_week, "Thursday");
        assert!(rows[0].signal_db.is_none());
    }
}
