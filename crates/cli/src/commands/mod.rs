//! CLI subcommand implementations

pub mod animate;
pub mod building;
pub mod export;
pub mod peak;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Write a document as pretty JSON to a file, or to stdout when no path is
/// given.
pub(crate) async fn write_json<T: Serialize>(document: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("Failed to serialize document")?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{}", json),
    }

    Ok(())
}
