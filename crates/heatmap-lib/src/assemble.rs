//! Time-series assembly for the animation renderer
//!
//! Turns the scaffolded grid into the list-of-lists shape that animated
//! heatmap layers consume: one chronological time index, and per metric one
//! outer list aligned with that index whose inner lists hold geolocated
//! weighted points. Inactive cells emit the invisible sentinel weight
//! instead of being dropped, which keeps the per-frame point count constant.

use crate::scaffold::ScaffoldCell;
use serde::Serialize;
use std::collections::BTreeSet;

/// Weight emitted for cells with no observation: plotted fully transparent.
pub const INVISIBLE_WEIGHT: f64 = 0.0;

/// One `(latitude, longitude, weight)` triple, serialized as a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedPoint(pub f64, pub f64, pub f64);

impl WeightedPoint {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }

    pub fn weight(&self) -> f64 {
        self.2
    }
}

/// Per-metric layers plus the shared chronological time index.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapSeries {
    /// Canonical bucket strings, chronologically sorted
    pub time_index: Vec<String>,
    /// Mean client health per AP, 0-100
    pub health: Vec<Vec<WeightedPoint>>,
    /// Signal quality, dBm shifted to a non-negative weight
    pub signal: Vec<Vec<WeightedPoint>>,
    /// Client sample count per AP
    pub clients: Vec<Vec<WeightedPoint>>,
}

/// Assemble the scaffolded grid into renderer-ready layers.
///
/// Every bucket frame contains exactly one point per geolocated access
/// point, active or not.
pub fn assemble_series(cells: &[ScaffoldCell]) -> HeatmapSeries {
    let buckets: BTreeSet<_> = cells.iter().map(|c| c.bucket).collect();
    let time_index: Vec<String> = buckets.iter().map(|b| b.canonical()).collect();
    let frame_of: std::collections::HashMap<_, _> = buckets
        .iter()
        .enumerate()
        .map(|(idx, bucket)| (*bucket, idx))
        .collect();

    let frames = buckets.len();
    let mut health = vec![Vec::new(); frames];
    let mut signal = vec![Vec::new(); frames];
    let mut clients = vec![Vec::new(); frames];

    for cell in cells {
        let idx = frame_of[&cell.bucket];
        let lat = cell.position.y();
        let lon = cell.position.x();

        match &cell.metric {
            Some(metric) => {
                health[idx].push(WeightedPoint(lat, lon, metric.avg_health));
                signal[idx].push(WeightedPoint(lat, lon, signal_weight(metric.avg_signal_db)));
                clients[idx].push(WeightedPoint(lat, lon, metric.sample_count as f64));
            }
            None => {
                health[idx].push(WeightedPoint(lat, lon, INVISIBLE_WEIGHT));
                signal[idx].push(WeightedPoint(lat, lon, INVISIBLE_WEIGHT));
                clients[idx].push(WeightedPoint(lat, lon, INVISIBLE_WEIGHT));
            }
        }
    }

    HeatmapSeries {
        time_index,
        health,
        signal,
        clients,
    }
}

/// Map a mean dBm reading to a non-negative heat weight.
///
/// Typical campus readings sit around -40 (excellent) to -90 (unusable),
/// so `100 + dBm` yields an intuitive 10-60 range, floored at zero.
pub fn signal_weight(avg_signal_db: f64) -> f64 {
    (100.0 + avg_signal_db).max(0.0)
}
