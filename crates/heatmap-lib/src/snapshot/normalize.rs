//! Record normalization from raw JSON dumps to typed observations

use super::{capture_time_from_filename, locate_snapshots, SnapshotKind};
use crate::bucket;
use crate::error::SnapshotError;
use crate::models::{ApObservation, ApSnapshot, ClientObservation, RawApRecord, RawClientRecord};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything recovered from one access-point dump directory
#[derive(Debug, Default)]
pub struct ApLoadResult {
    /// Per-record observations (records without a usable timestamp dropped)
    pub observations: Vec<ApObservation>,
    /// Per-file rollups, sorted by recovered capture time
    pub snapshots: Vec<ApSnapshot>,
    /// Number of files considered, including skipped ones
    pub files_read: usize,
}

/// Everything recovered from one client dump directory
#[derive(Debug, Default)]
pub struct ClientLoadResult {
    pub observations: Vec<ClientObservation>,
    pub files_read: usize,
}

/// Normalize raw access-point records.
///
/// `client_count` defaults to 0 when absent and negatives clamp to 0.
/// A record without a parseable `last_modified` epoch is dropped.
pub fn normalize_ap_records(records: &[RawApRecord]) -> Vec<ApObservation> {
    records
        .iter()
        .filter_map(|record| {
            let capture_time = epoch_seconds_to_utc(record.last_modified?)?;
            Some(ApObservation {
                name: record.name.clone(),
                serial: record.serial.clone(),
                client_count: clamp_count(record.client_count),
                capture_time,
            })
        })
        .collect()
}

/// Normalize raw client records.
///
/// A record without `last_connection_time` (epoch milliseconds) is dropped
/// silently; `health` / `signal_db` stay as optional values and are only
/// filtered later, at the point aggregation needs them.
pub fn normalize_client_records(records: &[RawClientRecord]) -> Vec<ClientObservation> {
    records
        .iter()
        .filter_map(|record| {
            let ts = epoch_millis_to_utc(record.last_connection_time?)?;
            Some(ClientObservation {
                associated_ap_name: record.associated_device_name.clone(),
                health: record.health,
                signal_db: record.signal_db,
                connection_time: ts,
                rounded_hour: bucket::rounded_hour(&ts),
                date: bucket::bucket_date(&ts),
                day_of_week: bucket::day_of_week(&ts),
            })
        })
        .collect()
}

/// Load and normalize every access-point snapshot in a directory.
///
/// Files with malformed names or invalid JSON are skipped with a warning;
/// only a directory-level read failure aborts. Snapshots are re-sorted by
/// their parsed capture time so chronology never depends on naming alone.
pub async fn load_ap_snapshots(dir: &Path, max_files: Option<usize>) -> Result<ApLoadResult> {
    let files = locate_snapshots(dir, SnapshotKind::AccessPoint.default_pattern(), max_files).await?;

    let mut result = ApLoadResult {
        files_read: files.len(),
        ..Default::default()
    };

    for path in &files {
        load_ap_file(path, &mut result).await;
    }

    result
        .snapshots
        .sort_by_key(|snapshot| snapshot.capture_time);

    info!(
        files = result.files_read,
        snapshots = result.snapshots.len(),
        observations = result.observations.len(),
        "Loaded access-point snapshots"
    );
    Ok(result)
}

/// Load only the most recent access-point snapshot in a directory.
///
/// Filenames embed zero-padded timestamps, so the lexicographically last
/// match is the latest capture. An empty directory yields an empty result,
/// not an error.
pub async fn load_latest_ap_snapshot(dir: &Path) -> Result<ApLoadResult> {
    let files =
        locate_snapshots(dir, SnapshotKind::AccessPoint.default_pattern(), None).await?;

    let mut result = ApLoadResult::default();
    let Some(path) = files.last() else {
        info!(dir = %dir.display(), "No access-point snapshots found");
        return Ok(result);
    };

    result.files_read = 1;
    load_ap_file(path, &mut result).await;

    info!(
        file = %path.display(),
        observations = result.observations.len(),
        "Loaded latest access-point snapshot"
    );
    Ok(result)
}

/// Load one AP snapshot file into a result, absorbing file-level failures.
async fn load_ap_file(path: &Path, result: &mut ApLoadResult) {
    let capture_time = match capture_time_from_filename(path) {
        Ok(ts) => ts,
        Err(e) => {
            warn!(error = %e, "Skipping snapshot with unrecoverable timestamp");
            return;
        }
    };

    let Some(records) = read_records::<RawApRecord>(path).await else {
        return;
    };

    let total_clients: u64 = records
        .iter()
        .map(|r| clamp_count(r.client_count) as u64)
        .sum();

    result.snapshots.push(ApSnapshot {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        capture_time,
        date: bucket::bucket_date(&capture_time),
        day_of_week: bucket::day_of_week(&capture_time),
        hour: bucket::truncated_hour(&capture_time),
        total_clients,
    });
    result.observations.extend(normalize_ap_records(&records));
}

/// Load and normalize every client snapshot in a directory.
pub async fn load_client_snapshots(dir: &Path, max_files: Option<usize>) -> Result<ClientLoadResult> {
    let files = locate_snapshots(dir, SnapshotKind::Client.default_pattern(), max_files).await?;

    let mut result = ClientLoadResult {
        files_read: files.len(),
        ..Default::default()
    };

    for path in &files {
        let Some(records) = read_records::<RawClientRecord>(path).await else {
            continue;
        };
        result
            .observations
            .extend(normalize_client_records(&records));
    }

    info!(
        files = result.files_read,
        observations = result.observations.len(),
        "Loaded client snapshots"
    );
    Ok(result)
}

/// Read one snapshot file, logging and absorbing file-level failures.
async fn read_records<T: DeserializeOwned>(path: &Path) -> Option<Vec<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(source) => {
            let e = SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            };
            warn!(error = %e, "Skipping unreadable snapshot file");
            return None;
        }
    };

    match parse_records(path, &content) {
        Ok(records) => {
            debug!(path = %path.display(), records = records.len(), "Parsed snapshot file");
            Some(records)
        }
        Err(e) => {
            warn!(error = %e, "Skipping snapshot with invalid format");
            None
        }
    }
}

/// Parse one snapshot payload: a JSON array of flat records.
fn parse_records<T: DeserializeOwned>(path: &Path, content: &str) -> Result<Vec<T>, SnapshotError> {
    serde_json::from_str(content).map_err(|source| SnapshotError::InvalidSnapshotFormat {
        path: path.to_path_buf(),
        source,
    })
}

fn clamp_count(raw: Option<f64>) -> u32 {
    raw.map(|v| v.max(0.0) as u32).unwrap_or(0)
}

fn epoch_seconds_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}

fn epoch_millis_to_utc(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn raw_client(json: &str) -> RawClientRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ap_record_without_timestamp_is_dropped() {
        let records: Vec<RawApRecord> = serde_json::from_str(
            r#"[
                {"name": "AP-C1-01", "client_count": 4, "last_modified": 1743654901},
                {"name": "AP-C1-02", "client_count": 9}
            ]"#,
        )
        .unwrap();

        let observations = normalize_ap_records(&records);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].name.as_deref(), Some("AP-C1-01"));
        assert_eq!(observations[0].client_count, 4);
    }

    #[test]
    fn test_ap_client_count_clamps_and_defaults() {
        let records: Vec<RawApRecord> = serde_json::from_str(
            r#"[
                {"name": "a", "client_count": -3, "last_modified": 1743654901},
                {"name": "b", "last_modified": 1743654901}
            ]"#,
        )
        .unwrap();

        let observations = normalize_ap_records(&records);
        assert_eq!(observations[0].client_count, 0);
        assert_eq!(observations[1].client_count, 0);
    }

    #[test]
    fn test_client_record_without_connection_time_is_dropped() {
        let records = vec![
            raw_client(r#"{"associated_device_name": "AP-C1-01", "health": 90, "signal_db": -55}"#),
            raw_client(
                r#"{"associated_device_name": "AP-C1-01", "health": 90, "signal_db": -55, "last_connection_time": 1743669301000}"#,
            ),
        ];

        let observations = normalize_client_records(&records);
        assert_eq!(observations.len(), 1);
    }

    #[test]
    fn test_client_buckets_derived_from_epoch_millis() {
        // 2025-04-03T08:45:01 UTC -> rounded hour 9
        let records = vec![raw_client(
            r#"{"associated_device_name": "AP-C1-01", "last_connection_time": 1743669901000}"#,
        )];

        let observations = normalize_client_records(&records);
        let obs = &observations[0];
        assert_eq!(obs.date.to_string(), "2025-04-03");
        assert_eq!(obs.rounded_hour, 9);
        assert_eq!(obs.day_of_week, "Thursday");
    }

    #[tokio::test]
    async fn test_load_ap_snapshots_rolls_up_and_sorts() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T10_00_01+02_00.json"),
            r#"[{"client_count": 5}, {"client_count": 3}]"#,
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T09_00_01+02_00.json"),
            r#"[{"client_count": 1}]"#,
        )
        .await
        .unwrap();

        let result = load_ap_snapshots(dir.path(), None).await.unwrap();

        assert_eq!(result.files_read, 2);
        assert_eq!(result.snapshots.len(), 2);
        assert_eq!(result.snapshots[0].hour, 9);
        assert_eq!(result.snapshots[0].total_clients, 1);
        assert_eq!(result.snapshots[1].total_clients, 8);
    }

    #[tokio::test]
    async fn test_load_ap_snapshots_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T10_00_01+02_00.json"),
            r#"[{"client_count": 2, "last_modified": 1743654901}]"#,
        )
        .await
        .unwrap();
        // Wrong token count in the name
        tokio::fs::write(
            dir.path().join("AP-info-v2-extra-2025-04-03T11_00_01+02_00.json"),
            r#"[{"client_count": 7}]"#,
        )
        .await
        .unwrap();
        // Valid name, broken payload
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T12_00_01+02_00.json"),
            "{not json",
        )
        .await
        .unwrap();

        let result = load_ap_snapshots(dir.path(), None).await.unwrap();

        assert_eq!(result.files_read, 3);
        assert_eq!(result.snapshots.len(), 1);
        assert_eq!(result.observations.len(), 1);
    }

    #[tokio::test]
    async fn test_load_latest_ap_snapshot_reads_only_the_last_file() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T09_00_01+02_00.json"),
            r#"[{"name": "AP-C1-01", "client_count": 1, "last_modified": 1743654901}]"#,
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.path().join("AP-info-v2-2025-04-03T10_00_01+02_00.json"),
            r#"[{"name": "AP-C1-01", "client_count": 6, "last_modified": 1743658501}]"#,
        )
        .await
        .unwrap();

        let result = load_latest_ap_snapshot(dir.path()).await.unwrap();

        assert_eq!(result.files_read, 1);
        assert_eq!(result.observations.len(), 1);
        assert_eq!(result.observations[0].client_count, 6);
        assert_eq!(result.snapshots[0].total_clients, 6);
    }

    #[tokio::test]
    async fn test_load_latest_ap_snapshot_empty_directory() {
        let dir = TempDir::new().unwrap();

        let result = load_latest_ap_snapshot(dir.path()).await.unwrap();
        assert_eq!(result.files_read, 0);
        assert!(result.observations.is_empty());
    }

    #[tokio::test]
    async fn test_load_client_snapshots() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("clients-001.json"),
            r#"[
                {"associated_device_name": "AP-C1-01", "health": 80, "signal_db": -60, "last_connection_time": 1743669901000},
                {"associated_device_name": "AP-C1-02", "health": 70, "signal_db": -70}
            ]"#,
        )
        .await
        .unwrap();

        let result = load_client_snapshots(dir.path(), None).await.unwrap();
        assert_eq!(result.files_read, 1);
        assert_eq!(result.observations.len(), 1);
    }
}
