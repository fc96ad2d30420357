//! Server configuration.
//!
//! Values come from command-line flags, falling back to environment variables
//! (optionally loaded from a `.env` file) and then to defaults.

use axum::http::{HeaderValue, Method};
use clap::Parser;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

/// Errors raised while turning configuration into runtime settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid allowed origin '{0}'")]
    InvalidOrigin(String),
}

/// Runtime configuration for the relay server
#[derive(Debug, Clone, Parser)]
#[command(name = "pairlink-server", version, about = "Session relay server for paired devices")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Comma separated list of allowed cross-origin callers; empty or `*` allows any
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Identifier echoed in ping replies
    #[arg(long, env = "SERVER_ID", default_value = "unknown")]
    pub server_id: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            allowed_origins: Vec::new(),
            server_id: "unknown".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load `.env` if present, then parse flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// `host:port` for display
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn allows_any_origin(&self) -> bool {
        let origins: Vec<&str> = self
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .collect();
        origins.is_empty() || origins.contains(&"*")
    }

    /// CORS policy for the HTTP and WebSocket routes.
    ///
    /// Credentials are only allowed together with an explicit origin list.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

        if self.allows_any_origin() {
            return Ok(cors.allow_origin(Any));
        }

        let origins = self
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cors.allow_origin(origins).allow_credentials(true))
    }
}
