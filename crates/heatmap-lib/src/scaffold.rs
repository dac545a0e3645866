//! Gap-filling scaffold over access points and time buckets
//!
//! Animated heatmaps need one point per geolocated access point in every
//! frame. If a frame simply omits an AP with no data, the renderer keeps
//! showing the previous frame's circle and activity appears to stack up.
//! The scaffold makes absence explicit: every (AP, bucket) pair exists,
//! and pairs without an aggregated metric are marked inactive while still
//! carrying a valid position.

use crate::bucket::TimeBucket;
use crate::error::SnapshotError;
use crate::geo::{GeoIndex, GeoLocation, Reprojector};
use crate::models::AggregatedMetric;
use geo::Point;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// An access point that survived the geolocation join.
#[derive(Debug, Clone)]
pub struct GeolocatedAp {
    pub name: String,
    /// Geographic position, x = longitude, y = latitude (degrees)
    pub position: Point<f64>,
    pub location: GeoLocation,
}

/// One cell of the full (access point × time bucket) grid.
#[derive(Debug, Clone)]
pub struct ScaffoldCell {
    pub ap_name: String,
    pub bucket: TimeBucket,
    /// Geographic position, x = longitude, y = latitude (degrees)
    pub position: Point<f64>,
    pub location: GeoLocation,
    /// Present only when an aggregated metric exists for this key
    pub metric: Option<AggregatedMetric>,
    pub active: bool,
}

/// Resolve observed AP names against the geolocation index.
///
/// Names with no feature, no projected coordinates or an unconvertible
/// position are dropped here — the join-miss case. They keep contributing
/// to non-spatial aggregates; they just never plot.
pub fn geolocate_access_points<I>(
    names: I,
    index: &GeoIndex,
    reprojector: &Reprojector,
) -> Vec<GeolocatedAp>
where
    I: IntoIterator<Item = String>,
{
    // BTreeSet: deduplicate and fix a deterministic output order.
    let names: BTreeSet<String> = names.into_iter().collect();

    let mut resolved = Vec::new();
    for name in names {
        let Some(location) = index.get(&name) else {
            debug!(ap = %name, "No geolocation match, excluded from spatial output");
            continue;
        };
        let Some(projected) = location.projected_point() else {
            debug!(ap = %name, "Geolocation has no projected coordinates");
            continue;
        };
        let Some((lat, lon)) = reprojector.to_lat_lon(projected) else {
            debug!(ap = %name, "Projected coordinates failed reprojection");
            continue;
        };
        resolved.push(GeolocatedAp {
            name,
            position: Point::new(lon, lat),
            location: location.clone(),
        });
    }

    info!(geolocated = resolved.len(), "Resolved access-point positions");
    resolved
}

/// Build the full cross-product grid and left-join metrics onto it.
///
/// The cell count is exactly `aps.len() * buckets.len()`; cells without a
/// metric are inactive but still positioned. Empty inputs mean the joins
/// produced nothing to plot, surfaced as [`SnapshotError::EmptyJoin`]
/// rather than a silently empty visualization.
pub fn build_scaffold(
    aps: &[GeolocatedAp],
    buckets: &BTreeSet<TimeBucket>,
    metrics: &[AggregatedMetric],
) -> Result<Vec<ScaffoldCell>, SnapshotError> {
    if aps.is_empty() || buckets.is_empty() {
        return Err(SnapshotError::EmptyJoin);
    }

    let by_key: HashMap<(chrono::NaiveDate, u32, &str), &AggregatedMetric> = metrics
        .iter()
        .map(|m| ((m.date, m.hour, m.ap_name.as_str()), m))
        .collect();

    let mut cells = Vec::with_capacity(aps.len() * buckets.len());
    for ap in aps {
        for bucket in buckets {
            let metric = by_key
                .get(&(bucket.date, bucket.hour, ap.name.as_str()))
                .map(|&m| m.clone());
            let active = metric.is_some();
            cells.push(ScaffoldCell {
                ap_name: ap.name.clone(),
                bucket: *bucket,
                position: ap.position,
                location: ap.location.clone(),
                metric,
                active,
            });
        }
    }

    info!(
        access_points = aps.len(),
        buckets = buckets.len(),
        cells = cells.len(),
        "Built scaffold grid"
    );
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ap(name: &str) -> GeolocatedAp {
        GeolocatedAp {
            name: name.to_string(),
            position: Point::new(2.1, 41.5),
            location: GeoLocation {
                space: None,
                building_code: None,
                building_name: None,
                floor: None,
                short_ref: None,
                x: Some(425_000.0),
                y: Some(4_594_000.0),
            },
        }
    }

    fn metric(date: &str, hour: u32, name: &str) -> AggregatedMetric {
        AggregatedMetric {
            date: date.parse().unwrap(),
            hour,
            ap_name: name.to_string(),
            avg_health: 80.0,
            avg_signal_db: -60.0,
            sample_count: 3,
        }
    }

    fn buckets(pairs: &[(&str, u32)]) -> BTreeSet<TimeBucket> {
        pairs
            .iter()
            .map(|(d, h)| TimeBucket::new(d.parse().unwrap(), *h))
            .collect()
    }

    #[test]
    fn test_cell_count_is_exactly_the_cross_product() {
        let aps = vec![ap("AP-C1-01"), ap("AP-C1-02"), ap("AP-B2-07")];
        let buckets = buckets(&[("2025-04-03", 9), ("2025-04-03", 10)]);
        let metrics = vec![metric("2025-04-03", 9, "AP-C1-01")];

        let cells = build_scaffold(&aps, &buckets, &metrics).unwrap();
        assert_eq!(cells.len(), 3 * 2);
    }

    #[test]
    fn test_inactive_cells_keep_their_position() {
        let aps = vec![ap("AP-C1-01")];
        let buckets = buckets(&[("2025-04-03", 9), ("2025-04-03", 10)]);
        let metrics = vec![metric("2025-04-03", 9, "AP-C1-01")];

        let cells = build_scaffold(&aps, &buckets, &metrics).unwrap();

        let active: Vec<_> = cells.iter().filter(|c| c.active).collect();
        let inactive: Vec<_> = cells.iter().filter(|c| !c.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(inactive.len(), 1);
        assert!(inactive[0].metric.is_none());
        assert_eq!(inactive[0].position.y(), 41.5);
    }

    #[test]
    fn test_empty_inputs_surface_empty_join() {
        let buckets = buckets(&[("2025-04-03", 9)]);
        let err = build_scaffold(&[], &buckets, &[]).unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyJoin));

        let err = build_scaffold(&[ap("AP-C1-01")], &BTreeSet::new(), &[]).unwrap_err();
        assert!(matches!(err, SnapshotError::EmptyJoin));
    }

    #[test]
    fn test_geolocate_drops_unmatched_and_unprojectable() {
        let index = GeoIndex::from_feature_collection(
            r#"{"features": [
                {"properties": {"USER_NOM_A": "AP-C1-01", "X": 425000.0, "Y": 4594000.0}},
                {"properties": {"USER_NOM_A": "AP-NO-XY"}},
                {"properties": {"USER_NOM_A": "AP-BAD-XY", "X": -5.0, "Y": 4594000.0}}
            ]}"#,
        )
        .unwrap();
        let reprojector = Reprojector::default();

        let names = ["AP-C1-01", "AP-NO-XY", "AP-BAD-XY", "AP-UNKNOWN"]
            .into_iter()
            .map(String::from);
        let resolved = geolocate_access_points(names, &index, &reprojector);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "AP-C1-01");
    }
}
