//! Campus WiFi heatmap CLI
//!
//! A command-line tool for building the filtered datasets, animated
//! heatmap series and peak-usage reports from controller snapshot dumps.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{animate, building, export, peak};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Campus WiFi heatmap CLI
#[derive(Parser)]
#[command(name = "campus-heatmap")]
#[command(author, version, about = "CLI for the campus WiFi heatmap pipeline", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the combined filtered dataset from AP and client dumps
    Export {
        /// Directory with access-point snapshot files
        #[arg(long, env = "HEATMAP_APS_DIR")]
        aps_dir: PathBuf,

        /// Directory with client snapshot files
        #[arg(long, env = "HEATMAP_CLIENTS_DIR")]
        clients_dir: PathBuf,

        /// Geolocation feature collection file
        #[arg(long, env = "HEATMAP_GEO_FILE")]
        geo_file: PathBuf,

        /// Combined document output file (stdout if no output flag is given)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also write the AP-only slice to this file
        #[arg(long)]
        aps_output: Option<PathBuf>,

        /// Also write the client-only slice to this file
        #[arg(long)]
        clients_output: Option<PathBuf>,

        /// Read at most this many AP snapshot files
        #[arg(long)]
        max_ap_files: Option<usize>,

        /// Read at most this many client snapshot files
        #[arg(long)]
        max_client_files: Option<usize>,
    },

    /// Build the animated heatmap time series for the map renderer
    Animate {
        /// Directory with client snapshot files
        #[arg(long, env = "HEATMAP_CLIENTS_DIR")]
        clients_dir: PathBuf,

        /// Geolocation feature collection file
        #[arg(long, env = "HEATMAP_GEO_FILE")]
        geo_file: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Read at most this many client snapshot files
        #[arg(long)]
        max_client_files: Option<usize>,
    },

    /// Show client load per building and per floor for the latest capture
    BuildingStats {
        /// Directory with access-point snapshot files
        #[arg(long, env = "HEATMAP_APS_DIR")]
        aps_dir: PathBuf,

        /// Geolocation feature collection file
        #[arg(long, env = "HEATMAP_GEO_FILE")]
        geo_file: PathBuf,

        /// Show only the busiest N buildings
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Show peak usage by hour and by day of week
    PeakHours {
        /// Directory with access-point snapshot files
        #[arg(long, env = "HEATMAP_APS_DIR")]
        aps_dir: PathBuf,

        /// Read at most this many AP snapshot files
        #[arg(long)]
        max_files: Option<usize>,

        /// Show only the busiest N slots
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Export {
            aps_dir,
            clients_dir,
            geo_file,
            output,
            aps_output,
            clients_output,
            max_ap_files,
            max_client_files,
        } => {
            export::run(export::ExportArgs {
                aps_dir: &aps_dir,
                clients_dir: &clients_dir,
                geo_file: &geo_file,
                output: output.as_deref(),
                aps_output: aps_output.as_deref(),
                clients_output: clients_output.as_deref(),
                max_ap_files,
                max_client_files,
            })
            .await?;
        }
        Commands::Animate {
            clients_dir,
            geo_file,
            output,
            max_client_files,
        } => {
            animate::run(&clients_dir, &geo_file, output.as_deref(), max_client_files).await?;
        }
        Commands::BuildingStats {
            aps_dir,
            geo_file,
            top,
        } => {
            building::run(&aps_dir, &geo_file, top, cli.format).await?;
        }
        Commands::PeakHours {
            aps_dir,
            max_files,
            top,
        } => {
            peak::run(&aps_dir, max_files, top, cli.format).await?;
        }
    }

    Ok(())
}
