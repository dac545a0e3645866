//! Snapshot file discovery and filename timestamp recovery

use crate::error::SnapshotError;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Discover snapshot files in a directory.
///
/// Returns paths matching the glob-style filename pattern in lexicographic
/// order, optionally capped to the first `max_files`. Filenames embed a
/// zero-padded timestamp, so lexicographic order is also chronological;
/// AP loaders re-sort by the parsed capture time anyway rather than rely
/// on naming discipline alone.
pub async fn locate_snapshots(
    dir: &Path,
    pattern: &str,
    max_files: Option<usize>,
) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(pattern)
        .with_context(|| format!("Invalid snapshot filename pattern: {pattern}"))?;

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read snapshot directory {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to list snapshot directory {}", dir.display()))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if pattern.matches(name) {
            files.push(path);
        }
    }

    files.sort();
    if let Some(max) = max_files {
        files.truncate(max);
    }

    debug!(count = files.len(), dir = %dir.display(), "Located snapshot files");
    Ok(files)
}

/// Recover a capture timestamp from an encoded snapshot filename.
///
/// Expected shape: `AP-info-v2-2025-04-03T00_15_01+02_00.json`. The stem
/// splits on `-` into six tokens; tokens 3..6 encode the date and a
/// time-with-offset segment where `_` stands in for the `:` that RFC 3339
/// requires. Any deviation is `MalformedFilename`, fatal for this file only.
pub fn capture_time_from_filename(path: &Path) -> Result<DateTime<FixedOffset>, SnapshotError> {
    let malformed = || SnapshotError::MalformedFilename {
        path: path.to_path_buf(),
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(malformed)?;

    let parts: Vec<&str> = stem.split('-').collect();
    if parts.len() != 6 {
        return Err(malformed());
    }

    let encoded = parts[3..6].join("-").replace('_', ":");
    DateTime::parse_from_rfc3339(&encoded).map_err(|_| malformed())
}
