//! Server configuration

use anyhow::Result;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upstream chat-completion endpoint
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the upstream API
    #[serde(default)]
    pub api_key: String,

    /// Context document injected into every chat question
    #[serde(default)]
    pub context_file: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    /// Allow any browser origin; the map frontend is often opened straight
    /// from disk
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

fn default_port() -> u16 {
    8000
}

fn default_upstream_url() -> String {
    "https://api.publicai.co/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "BSC-LT/salamandra-7b-instruct-tools-16k".to_string()
}

fn default_upstream_timeout() -> u64 {
    60
}

fn default_cors_permissive() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            upstream_url: default_upstream_url(),
            model: default_model(),
            api_key: String::new(),
            context_file: None,
            upstream_timeout_secs: default_upstream_timeout(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `HEATMAP_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HEATMAP"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
