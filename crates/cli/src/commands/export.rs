//! Combined dataset export command

use crate::commands::write_json;
use crate::output::print_success;
use anyhow::Result;
use heatmap_lib::pipeline::{build_combined_dataset, DatasetOptions};
use std::path::Path;

pub struct ExportArgs<'a> {
    pub aps_dir: &'a Path,
    pub clients_dir: &'a Path,
    pub geo_file: &'a Path,
    pub output: Option<&'a Path>,
    pub aps_output: Option<&'a Path>,
    pub clients_output: Option<&'a Path>,
    pub max_ap_files: Option<usize>,
    pub max_client_files: Option<usize>,
}

/// Build the filtered dataset and write the requested documents.
///
/// `--aps-output` and `--clients-output` write the per-kind slices on their
/// own; the combined document goes to `--output`, or to stdout when no
/// output flag is given at all.
pub async fn run(args: ExportArgs<'_>) -> Result<()> {
    let dataset = build_combined_dataset(
        args.aps_dir,
        args.clients_dir,
        args.geo_file,
        DatasetOptions {
            max_ap_files: args.max_ap_files,
            max_client_files: args.max_client_files,
        },
    )
    .await?;

    if let Some(path) = args.aps_output {
        write_json(&dataset.aps, Some(path)).await?;
        print_success(&format!(
            "Wrote {} AP rows to {}",
            dataset.aps.len(),
            path.display()
        ));
    }
    if let Some(path) = args.clients_output {
        write_json(&dataset.clients, Some(path)).await?;
        print_success(&format!(
            "Wrote {} client rows to {}",
            dataset.clients.len(),
            path.display()
        ));
    }

    let slices_only = args.output.is_none()
        && (args.aps_output.is_some() || args.clients_output.is_some());
    if !slices_only {
        write_json(&dataset, args.output).await?;
        if let Some(path) = args.output {
            print_success(&format!(
                "Wrote {} AP rows and {} client rows to {}",
                dataset.aps.len(),
                dataset.clients.len(),
                path.display()
            ));
        }
    }

    Ok(())
}
