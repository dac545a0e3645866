//! Peak-usage report command

use crate::output::{format_clients, print_info, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use heatmap_lib::pipeline::build_peak_report;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Row for the by-hour table
#[derive(Tabled)]
struct HourRow {
    #[tabled(rename = "Hour")]
    hour: String,
    #[tabled(rename = "Avg clients")]
    avg_clients: String,
    #[tabled(rename = "Snapshots")]
    snapshots: u64,
}

/// Row for the by-day-and-hour table
#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Hour")]
    hour: String,
    #[tabled(rename = "Avg clients")]
    avg_clients: String,
    #[tabled(rename = "Snapshots")]
    snapshots: u64,
}

/// Show the busiest hours across the captured snapshots.
pub async fn run(
    aps_dir: &Path,
    max_files: Option<usize>,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let report = build_peak_report(aps_dir, max_files).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            if report.by_hour.is_empty() {
                print_info("No access-point snapshots found");
                return Ok(());
            }

            println!("{}", "Peak usage by hour".bold());
            let rows: Vec<HourRow> = report
                .by_hour
                .iter()
                .take(top)
                .map(|h| HourRow {
                    hour: format!("{:02}:00", h.hour),
                    avg_clients: format_clients(h.avg_clients),
                    snapshots: h.snapshots,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!();

            println!("{}", "Peak usage by day and hour".bold());
            let rows: Vec<SlotRow> = report
                .by_day_and_hour
                .iter()
                .take(top)
                .map(|s| SlotRow {
                    day: s.day_of_week.clone(),
                    hour: format!("{:02}:00", s.hour),
                    avg_clients: format_clients(s.avg_clients),
                    snapshots: s.snapshots,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    Ok(())
}
