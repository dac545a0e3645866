//! End-to-end pipeline runs
//!
//! Each function here is one complete run: discover snapshot files, recover
//! timestamps, normalize, aggregate, and shape the result for one consumer.
//! Callers hand over directories and get back a finished product; every
//! intermediate stage stays reusable on its own.

use crate::aggregate::{self, BuildingReport, PeakReport};
use crate::assemble::{assemble_series, HeatmapSeries};
use crate::bucket::TimeBucket;
use crate::export::{
    ap_export_records, client_export_records, CombinedDataset, DatasetMeta,
};
use crate::geo::{GeoIndex, Reprojector};
use crate::scaffold::{build_scaffold, geolocate_access_points};
use crate::snapshot::{load_ap_snapshots, load_client_snapshots, load_latest_ap_snapshot};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// File caps for a combined dataset run. `None` means read everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetOptions {
    pub max_ap_files: Option<usize>,
    pub max_client_files: Option<usize>,
}

/// Build the animated heatmap time series from a client dump directory and
/// the facilities feature collection.
///
/// Stages: load and normalize client snapshots, aggregate per
/// (date, hour, AP), geolocate the APs seen in the aggregates, scaffold the
/// full grid, and assemble renderer-ready frames. Fails when the
/// geolocation join leaves nothing to plot.
pub async fn build_heatmap_series(
    clients_dir: &Path,
    geo_file: &Path,
    max_client_files: Option<usize>,
) -> Result<HeatmapSeries> {
    let loaded = load_client_snapshots(clients_dir, max_client_files)
        .await
        .context("Failed to load client snapshots")?;
    let metrics = aggregate::aggregate_client_metrics(&loaded.observations);

    let index = GeoIndex::load(geo_file).await?;
    let reprojector = Reprojector::default();

    let names = metrics.iter().filter_map(|m| {
        if m.ap_name.is_empty() {
            None
        } else {
            Some(m.ap_name.clone())
        }
    });
    let aps = geolocate_access_points(names, &index, &reprojector);

    let buckets: BTreeSet<TimeBucket> = metrics
        .iter()
        .map(|m| TimeBucket::new(m.date, m.hour))
        .collect();

    let cells = build_scaffold(&aps, &buckets, &metrics)?;
    let series = assemble_series(&cells);

    info!(
        frames = series.time_index.len(),
        access_points = aps.len(),
        "Assembled heatmap series"
    );
    Ok(series)
}

/// Build the combined filtered dataset: geolocated AP rows, bucketed client
/// rows, and a metadata block with input file counts.
pub async fn build_combined_dataset(
    aps_dir: &Path,
    clients_dir: &Path,
    geo_file: &Path,
    options: DatasetOptions,
) -> Result<CombinedDataset> {
    let ap_loaded = load_ap_snapshots(aps_dir, options.max_ap_files)
        .await
        .context("Failed to load access-point snapshots")?;
    let client_loaded = load_client_snapshots(clients_dir, options.max_client_files)
        .await
        .context("Failed to load client snapshots")?;
    let index = GeoIndex::load(geo_file).await?;

    let dataset = CombinedDataset {
        aps: ap_export_records(&ap_loaded.observations, &index),
        clients: client_export_records(&client_loaded.observations),
        meta: DatasetMeta {
            aps_files: ap_loaded.files_read,
            client_files: client_loaded.files_read,
        },
    };

    info!(
        ap_rows = dataset.aps.len(),
        client_rows = dataset.clients.len(),
        "Built combined dataset"
    );
    Ok(dataset)
}

/// Build the peak-usage report from access-point snapshot rollups.
pub async fn build_peak_report(aps_dir: &Path, max_files: Option<usize>) -> Result<PeakReport> {
    let loaded = load_ap_snapshots(aps_dir, max_files)
        .await
        .context("Failed to load access-point snapshots")?;
    Ok(aggregate::peak_usage(&loaded.snapshots))
}

/// Build the per-building and per-floor load report from the latest
/// access-point snapshot.
///
/// A single capture answers "where are the clients right now"; mixing
/// captures would double-count every AP.
pub async fn build_building_report(aps_dir: &Path, geo_file: &Path) -> Result<BuildingReport> {
    let loaded = load_latest_ap_snapshot(aps_dir)
        .await
        .context("Failed to load the latest access-point snapshot")?;
    let index = GeoIndex::load(geo_file).await?;
    Ok(aggregate::building_stats(&loaded.observations, &index))
}
