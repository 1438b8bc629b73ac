//! Configuration management
//!
//! Loaded from `RIDELINK_*` environment variables with defaults suitable
//! for local development, validated before the server starts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Connection pool size
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Emit request span events
    pub log_requests: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8090,
            },
            database: DatabaseConfig {
                postgres_url: "postgresql://localhost:5432/ridelink_admin".to_string(),
                max_connections: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("RIDELINK_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("RIDELINK_PORT") {
            config.server.port = port.parse().context("Invalid RIDELINK_PORT value")?;
        }

        if let Ok(url) = env::var("RIDELINK_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(max) = env::var("RIDELINK_DB_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .context("Invalid RIDELINK_DB_MAX_CONNECTIONS value")?;
        }

        if let Ok(level) = env::var("RIDELINK_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(log_requests) = env::var("RIDELINK_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid RIDELINK_LOG_REQUESTS value")?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!("PostgreSQL URL cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("Database pool size must be non-zero"));
        }

        Ok(())
    }
}
