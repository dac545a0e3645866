//! Geolocation index for access points
//!
//! The campus facilities department publishes a GeoJSON-style feature
//! collection with one feature per access point, keyed by the AP display
//! name and carrying projected ETRS89 / UTM zone 31N coordinates. This
//! module builds the read-only name index; the companion [`reproject`]
//! module converts the projected coordinates to latitude/longitude.

pub mod reproject;

pub use reproject::Reprojector;

use anyhow::{Context, Result};
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Physical location of one access point, as published by facilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub space: Option<String>,
    pub building_code: Option<String>,
    pub building_name: Option<String>,
    pub floor: Option<i64>,
    pub short_ref: Option<String>,
    /// Projected easting (EPSG:25831), metres
    pub x: Option<f64>,
    /// Projected northing (EPSG:25831), metres
    pub y: Option<f64>,
}

impl GeoLocation {
    /// Projected point, when both coordinates are present.
    pub fn projected_point(&self) -> Option<Point<f64>> {
        Some(Point::new(self.x?, self.y?))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

/// Read-only lookup from access-point display name to location.
///
/// Built once per run and shared; APs whose name is absent from the feature
/// collection simply never resolve, which downstream joins treat as
/// "no plotted point", never as an error.
#[derive(Debug, Default)]
pub struct GeoIndex {
    locations: HashMap<String, GeoLocation>,
}

impl GeoIndex {
    /// Load and index a feature collection file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read feature collection {}", path.display()))?;
        let index = Self::from_feature_collection(&content)
            .with_context(|| format!("Failed to parse feature collection {}", path.display()))?;
        info!(
            access_points = index.len(),
            path = %path.display(),
            "Built geolocation index"
        );
        Ok(index)
    }

    /// Index a feature collection JSON document by the AP name property.
    ///
    /// Features without a usable `USER_NOM_A` are skipped. Later duplicates
    /// of the same name win, matching the source dataset convention of
    /// keeping the last published record.
    pub fn from_feature_collection(json: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_str(json).context("Feature collection is not valid JSON")?;

        let mut locations = HashMap::new();
        for feature in &collection.features {
            let props = &feature.properties;
            let Some(name) = props.get("USER_NOM_A").and_then(Value::as_str) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            locations.insert(
                name.to_string(),
                GeoLocation {
                    space: prop_string(props, "USER_Espai"),
                    building_code: prop_string(props, "Nom_Edific"),
                    building_name: prop_string(props, "USER_EDIFI"),
                    floor: props.get("Num_Planta").and_then(prop_i64),
                    short_ref: prop_string(props, "Ref_Curta"),
                    x: props.get("X").and_then(crate::models::coerce_f64),
                    y: props.get("Y").and_then(crate::models::coerce_f64),
                },
            );
        }

        debug!(indexed = locations.len(), "Indexed geolocation features");
        Ok(Self { locations })
    }

    pub fn get(&self, name: &str) -> Option<&GeoLocation> {
        self.locations.get(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// All indexed AP names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }
}

fn prop_string(props: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn prop_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "USER_NOM_A": "AP-C1-01",
                    "USER_Espai": "C1/021",
                    "Nom_Edific": "C1",
                    "USER_EDIFI": "Ciencies",
                    "Num_Planta": "1",
                    "Ref_Curta": "C1-021",
                    "X": 425010.5,
                    "Y": 4594200.25
                }
            },
            {
                "type": "Feature",
                "properties": {"USER_EDIFI": "Sense nom"}
            },
            {
                "type": "Feature",
                "properties": {"USER_NOM_A": "AP-B2-07", "X": 425500.0}
            }
        ]
    }"#;

    #[test]
    fn test_index_maps_properties() {
        let index = GeoIndex::from_feature_collection(COLLECTION).unwrap();

        assert_eq!(index.len(), 2);
        let loc = index.get("AP-C1-01").unwrap();
        assert_eq!(loc.space.as_deref(), Some("C1/021"));
        assert_eq!(loc.building_code.as_deref(), Some("C1"));
        assert_eq!(loc.building_name.as_deref(), Some("Ciencies"));
        assert_eq!(loc.floor, Some(1));
        assert_eq!(loc.x, Some(425010.5));
        assert_eq!(loc.y, Some(4594200.25));
    }

    #[test]
    fn test_nameless_features_are_skipped() {
        let index = GeoIndex::from_feature_collection(COLLECTION).unwrap();
        assert!(index.get("Sense nom").is_none());
    }

    #[test]
    fn test_incomplete_coordinates_have_no_projected_point() {
        let index = GeoIndex::from_feature_collection(COLLECTION).unwrap();

        assert!(index.get("AP-B2-07").unwrap().projected_point().is_none());
        let point = index.get("AP-C1-01").unwrap().projected_point().unwrap();
        assert_eq!(point.x(), 425010.5);
    }

    #[test]
    fn test_unmatched_name_resolves_to_none() {
        let index = GeoIndex::from_feature_collection(COLLECTION).unwrap();
        assert!(index.get("AP-Z9-99").is_none());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(GeoIndex::from_feature_collection("not json").is_err());
    }
}
