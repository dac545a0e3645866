//! Per-building load report command

use crate::output::{format_clients, print_info, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use heatmap_lib::pipeline::build_building_report;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Row for the by-building table
#[derive(Tabled)]
struct BuildingRow {
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "APs")]
    ap_count: u64,
    #[tabled(rename = "Clients")]
    total_clients: u64,
    #[tabled(rename = "Avg/AP")]
    avg_clients: String,
    #[tabled(rename = "Max AP")]
    max_clients: u32,
}

/// Row for the by-floor table
#[derive(Tabled)]
struct FloorRow {
    #[tabled(rename = "Floor")]
    floor: String,
    #[tabled(rename = "APs")]
    ap_count: u64,
    #[tabled(rename = "Clients")]
    total_clients: u64,
}

/// Show client load per building and per floor for the latest capture.
pub async fn run(
    aps_dir: &Path,
    geo_file: &Path,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let report = build_building_report(aps_dir, geo_file).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            if report.by_building.is_empty() {
                print_info("No geolocated access points in the latest snapshot");
                return Ok(());
            }

            println!("{}", "Client load by building".bold());
            let rows: Vec<BuildingRow> = report
                .by_building
                .iter()
                .take(top)
                .map(|b| BuildingRow {
                    building: b.building.clone(),
                    ap_count: b.ap_count,
                    total_clients: b.total_clients,
                    avg_clients: format_clients(b.avg_clients),
                    max_clients: b.max_clients,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!();

            println!("{}", "Distribution by floor".bold());
            let rows: Vec<FloorRow> = report
                .by_floor
                .iter()
                .map(|f| FloorRow {
                    floor: format_floor(f.floor),
                    ap_count: f.ap_count,
                    total_clients: f.total_clients,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    Ok(())
}

fn format_floor(floor: i64) -> String {
    if floor < 0 {
        format!("Basement {}", -floor)
    } else {
        format!("Floor {}", floor)
    }
}
