//! Snapshot ingestion from controller dump directories
//!
//! The campus controller writes one JSON file per capture, one array of flat
//! records per file. Two kinds exist: access-point status dumps (timestamp
//! encoded in the filename) and client-association dumps (timestamp embedded
//! per record). Discovery, timestamp recovery and normalization live here.

mod locator;
mod normalize;

pub use locator::{capture_time_from_filename, locate_snapshots};
pub use normalize::{
    load_ap_snapshots, load_client_snapshots, load_latest_ap_snapshot, normalize_ap_records,
    normalize_client_records, ApLoadResult, ClientLoadResult,
};

/// Data kinds captured by the network controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    AccessPoint,
    Client,
}

impl SnapshotKind {
    /// Default filename pattern for this kind's dump directory
    pub fn default_pattern(&self) -> &'static str {
        match self {
            SnapshotKind::AccessPoint => "AP-info-v2-*.json",
            SnapshotKind::Client => "*.json",
        }
    }
}
