//! Metric aggregation
//!
//! Two views are computed here. The client view groups association records
//! by (date, rounded hour, access point) and averages health and signal;
//! the peak-usage view averages per-snapshot total client load by truncated
//! hour, optionally split by day of week. Both are pure reductions: input
//! order never affects the result.

use crate::geo::GeoIndex;
use crate::models::{AggregatedMetric, ApObservation, ApSnapshot, ClientObservation};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct MetricAccumulator {
    health_sum: f64,
    signal_sum: f64,
    count: u64,
}

/// Aggregate client observations into per-(date, hour, AP) means.
///
/// Rows with a null health, null signal or missing AP association are
/// excluded here — and only here. Groups with no qualifying record simply
/// never appear; the scaffold builder fills those gaps explicitly later.
/// Output order is unspecified.
pub fn aggregate_client_metrics(observations: &[ClientObservation]) -> Vec<AggregatedMetric> {
    let mut groups: HashMap<(chrono::NaiveDate, u32, String), MetricAccumulator> = HashMap::new();

    for obs in observations {
        let (Some(name), Some(health), Some(signal)) =
            (&obs.associated_ap_name, obs.health, obs.signal_db)
        else {
            continue;
        };

        let acc = groups
            .entry((obs.date, obs.rounded_hour, name.clone()))
            .or_default();
        acc.health_sum += health;
        acc.signal_sum += signal;
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|((date, hour, ap_name), acc)| AggregatedMetric {
            date,
            hour,
            ap_name,
            avg_health: acc.health_sum / acc.count as f64,
            avg_signal_db: acc.signal_sum / acc.count as f64,
            sample_count: acc.count,
        })
        .collect()
}

/// Mean total client load for one hour of day, all days mixed
#[derive(Debug, Clone, Serialize)]
pub struct HourlyLoad {
    pub hour: u32,
    pub avg_clients: f64,
    pub snapshots: u64,
}

/// Mean total client load for one (day of week, hour) slot
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyLoad {
    pub day_of_week: String,
    pub hour: u32,
    pub avg_clients: f64,
    pub snapshots: u64,
}

/// Peak-usage report over access-point snapshot rollups
#[derive(Debug, Clone, Serialize)]
pub struct PeakReport {
    pub by_hour: Vec<HourlyLoad>,
    pub by_day_and_hour: Vec<WeeklyLoad>,
}

/// Average per-snapshot total clients by truncated hour and by
/// (day of week, hour), both sorted busiest first.
pub fn peak_usage(snapshots: &[ApSnapshot]) -> PeakReport {
    let mut by_hour: HashMap<u32, (u64, u64)> = HashMap::new();
    let mut by_slot: HashMap<(String, u32), (u64, u64)> = HashMap::new();

    for snapshot in snapshots {
        let entry = by_hour.entry(snapshot.hour).or_default();
        entry.0 += snapshot.total_clients;
        entry.1 += 1;

        let entry = by_slot
            .entry((snapshot.day_of_week.clone(), snapshot.hour))
            .or_default();
        entry.0 += snapshot.total_clients;
        entry.1 += 1;
    }

    let mut by_hour: Vec<HourlyLoad> = by_hour
        .into_iter()
        .map(|(hour, (sum, n))| HourlyLoad {
            hour,
            avg_clients: sum as f64 / n as f64,
            snapshots: n,
        })
        .collect();

    let mut by_day_and_hour: Vec<WeeklyLoad> = by_slot
        .into_iter()
        .map(|((day_of_week, hour), (sum, n))| WeeklyLoad {
            day_of_week,
            hour,
            avg_clients: sum as f64 / n as f64,
            snapshots: n,
        })
        .collect();

    // Busiest first; hour breaks ties so equal means render deterministically.
    by_hour.sort_by(|a, b| {
        b.avg_clients
            .total_cmp(&a.avg_clients)
            .then(a.hour.cmp(&b.hour))
    });
    by_day_and_hour.sort_by(|a, b| {
        b.avg_clients
            .total_cmp(&a.avg_clients)
            .then(a.day_of_week.cmp(&b.day_of_week))
            .then(a.hour.cmp(&b.hour))
    });

    PeakReport {
        by_hour,
        by_day_and_hour,
    }
}

/// Client load for one building
#[derive(Debug, Clone, Serialize)]
pub struct BuildingLoad {
    pub building: String,
    pub ap_count: u64,
    pub total_clients: u64,
    pub avg_clients: f64,
    pub max_clients: u32,
}

/// AP and client distribution for one floor, all buildings mixed
#[derive(Debug, Clone, Serialize)]
pub struct FloorLoad {
    pub floor: i64,
    pub ap_count: u64,
    pub total_clients: u64,
}

/// Per-building and per-floor load report over one set of AP observations
#[derive(Debug, Clone, Serialize)]
pub struct BuildingReport {
    pub by_building: Vec<BuildingLoad>,
    pub by_floor: Vec<FloorLoad>,
}

/// Group AP observations by building and by floor via the geolocation index.
///
/// Observations whose AP name has no feature or whose feature lacks a
/// building name are excluded, the join-miss case again. Buildings sort
/// busiest first; floors sort ascending. Floor rows only count features
/// that carry a floor number.
pub fn building_stats(observations: &[ApObservation], index: &GeoIndex) -> BuildingReport {
    let mut by_building: HashMap<String, (u64, u64, u32)> = HashMap::new();
    let mut by_floor: HashMap<i64, (u64, u64)> = HashMap::new();

    for obs in observations {
        let Some(location) = obs.name.as_deref().and_then(|name| index.get(name)) else {
            continue;
        };
        let Some(building) = location.building_name.clone() else {
            continue;
        };

        let entry = by_building.entry(building).or_default();
        entry.0 += 1;
        entry.1 += obs.client_count as u64;
        entry.2 = entry.2.max(obs.client_count);

        if let Some(floor) = location.floor {
            let entry = by_floor.entry(floor).or_default();
            entry.0 += 1;
            entry.1 += obs.client_count as u64;
        }
    }

    let mut by_building: Vec<BuildingLoad> = by_building
        .into_iter()
        .map(|(building, (aps, total, max))| BuildingLoad {
            building,
            ap_count: aps,
            total_clients: total,
            avg_clients: total as f64 / aps as f64,
            max_clients: max,
        })
        .collect();
    by_building.sort_by(|a, b| {
        b.total_clients
            .cmp(&a.total_clients)
            .then(a.building.cmp(&b.building))
    });

    let mut by_floor: Vec<FloorLoad> = by_floor
        .into_iter()
        .map(|(floor, (aps, total))| FloorLoad {
            floor,
            ap_count: aps,
            total_clients: total,
        })
        .collect();
    by_floor.sort_by_key(|f| f.floor);

    BuildingReport {
        by_building,
        by_floor,
    }
}
