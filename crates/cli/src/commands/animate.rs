//! Heatmap series command

use crate::commands::write_json;
use crate::output::{print_success, print_warning};
use anyhow::Result;
use heatmap_lib::pipeline::build_heatmap_series;
use std::path::Path;

/// Build the animated heatmap time series and write it out.
pub async fn run(
    clients_dir: &Path,
    geo_file: &Path,
    output: Option<&Path>,
    max_client_files: Option<usize>,
) -> Result<()> {
    let series = build_heatmap_series(clients_dir, geo_file, max_client_files).await?;

    if series.time_index.len() == 1 {
        print_warning("Only one time bucket in the input, the animation will be static");
    }

    write_json(&series, output).await?;

    if let Some(path) = output {
        print_success(&format!(
            "Wrote {} frames to {}",
            series.time_index.len(),
            path.display()
        ));
    }

    Ok(())
}
