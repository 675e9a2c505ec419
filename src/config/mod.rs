use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod watcher;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Configuration shared between the server, the watcher and the middleware.
pub type SharedConfig = Arc<RwLock<AppConfig>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

/// Settings for the body capturing middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub include_request_body: bool,
    pub include_response_body: bool,
    /// Capture stops once this many bytes are buffered; the rest is streamed through.
    pub max_body_bytes: usize,
    /// Scheme reported when the request carries none.
    pub default_scheme: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            timeout_seconds: 30,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_request_body: true,
            include_response_body: true,
            max_body_bytes: 1024 * 1024,
            default_scheme: "http".to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> String {
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("GATEWAY").separator("__"));

        // Override with environment variables if present
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>()?)?;
        }
        if let Ok(metrics_port) = std::env::var("METRICS_PORT") {
            builder = builder.set_override("metrics.port", metrics_port.parse::<u16>()?)?;
        }

        let settings = builder.build()?;
        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}
