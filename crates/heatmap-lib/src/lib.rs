//! Heatmap library for campus WiFi analytics
//!
//! This crate provides the core functionality for:
//! - Snapshot discovery and timestamp recovery
//! - Record normalization from raw controller dumps
//! - Temporal bucketing and metric aggregation
//! - Geolocation lookup and coordinate reprojection
//! - Scaffold construction and time-series assembly for animated heatmaps

pub mod aggregate;
pub mod assemble;
pub mod bucket;
pub mod error;
pub mod export;
pub mod geo;
pub mod models;
pub mod pipeline;
pub mod scaffold;
pub mod snapshot;

pub use bucket::TimeBucket;
pub use error::SnapshotError;
pub use models::*;
