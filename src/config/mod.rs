//! Configuration module for statdash
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`STATDASH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use statdash::config::ConsoleConfig;
//!
//! // Load defaults
//! let config = ConsoleConfig::default();
//! assert_eq!(config.stream.channel, "statistics");
//!
//! // Parse from TOML
//! let toml = r#"
//! [stream]
//! endpoint = "wss://ops.example/ws/statistics"
//! "#;
//! let config: ConsoleConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.stream.endpoint, "wss://ops.example/ws/statistics");
//! ```

pub mod error;
pub mod logging;
pub mod stream;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use stream::StreamConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Unified configuration for the statistics console.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Statistics stream connection settings
    pub stream: StreamConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports STATDASH_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("STATDASH_ENDPOINT") {
            self.stream.endpoint = endpoint;
        }
        if let Ok(channel) = std::env::var("STATDASH_CHANNEL") {
            self.stream.channel = channel;
        }
        if let Ok(attempts) = std::env::var("STATDASH_MAX_RECONNECT_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.stream.max_reconnect_attempts = n;
            }
        }
        if let Ok(delay) = std::env::var("STATDASH_RECONNECT_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                self.stream.reconnect_delay_ms = ms;
            }
        }

        if let Ok(level) = std::env::var("STATDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("STATDASH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "stream.endpoint".to_string(),
                message: "endpoint cannot be empty".to_string(),
            });
        }
        match Url::parse(&self.stream.endpoint) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => {
                return Err(ConfigError::Validation {
                    field: "stream.endpoint".to_string(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::Validation {
                    field: "stream.endpoint".to_string(),
                    message: e.to_string(),
                })
            }
        }

        if self.stream.channel.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "stream.channel".to_string(),
                message: "channel cannot be empty".to_string(),
            });
        }
        if self.stream.ping_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "stream.ping_interval_seconds".to_string(),
                message: "ping interval must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
