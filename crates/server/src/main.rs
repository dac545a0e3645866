//! Campus WiFi heatmap backend
//!
//! Serves the health endpoint and the chat passthrough used by the map
//! frontend's assistant panel.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod chat;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting heatmap-server");

    let config = config::ServerConfig::load()?;
    if config.api_key.is_empty() {
        warn!("HEATMAP_API_KEY is not set, upstream chat requests will be rejected");
    }

    // Context document is read once at startup; a missing file is fatal when
    // configured, since every answer is supposed to be grounded in it.
    let context = match &config.context_file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read context file {}: {}", path, e)
        })?,
        None => String::new(),
    };

    let chat = chat::ChatClient::new(
        &config.upstream_url,
        &config.api_key,
        &config.model,
        context.trim().to_string(),
        config.upstream_timeout_secs,
    )?;
    let app_state = Arc::new(api::AppState::new(chat));

    let api_handle = tokio::spawn(api::serve(config.port, app_state, config.cors_permissive));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
        result = api_handle => {
            result??;
        }
    }

    Ok(())
}
