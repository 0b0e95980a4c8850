//! Configuration management for SyncLayer Server

use std::env;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// How long deletion tombstones are kept. `None` disables tombstones.
    pub tombstone_retention: Option<Duration>,
    /// Interval of the background tombstone pruning task
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            tombstone_retention: None,
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server.port),
            },
            sync: SyncConfig {
                tombstone_retention: parse_var::<u64>("SYNC_TOMBSTONE_RETENTION_SECS")?
                    .map(Duration::from_secs),
                cleanup_interval: parse_var::<u64>("SYNC_CLEANUP_INTERVAL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.sync.cleanup_interval),
            },
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}
