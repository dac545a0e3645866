//! Typed errors for the snapshot pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while ingesting and reconciling snapshot data.
///
/// Filename and format errors are fatal for a single file only: loaders
/// skip the offending file with a warning and continue the run.
/// `EmptyJoin` is a run-level outcome and aborts the whole build.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filename does not follow the `<kind>-<label>-<version>-<timestamp>` scheme
    #[error("malformed snapshot filename: {path}")]
    MalformedFilename { path: PathBuf },

    /// File contents are not a JSON array of flat records
    #[error("invalid snapshot format in {path}: {source}")]
    InvalidSnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No geolocated access point overlaps the aggregated metrics
    #[error("no common access points between metrics and geolocation data")]
    EmptyJoin,

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
