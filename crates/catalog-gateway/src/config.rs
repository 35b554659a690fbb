//! # Gateway Configuration
//!
//! Environment-based configuration for the API gateway.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Rejected configuration value
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Base URL of the product service
    pub upstream_url: String,

    /// Per-request upstream timeout
    pub upstream_timeout: Duration,

    /// Logging level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_addr = match lookup("SERVER_ADDR") {
            Some(value) => match value.parse() {
                Ok(addr) => addr,
                Err(_) => return Err(ConfigError { name: "SERVER_ADDR", value }),
            },
            None => SocketAddr::from(([0, 0, 0, 0], 8000)),
        };

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => match value.parse::<f64>() {
                Ok(secs) if secs > 0.0 && secs.is_finite() => Duration::from_secs_f64(secs),
                _ => {
                    return Err(ConfigError {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => Duration::from_secs(5),
        };

        Ok(Self {
            server_addr,
            upstream_url: lookup("PRODUCT_SERVICE_URL")
                .unwrap_or_else(|| "http://product-service:5000".to_string()),
            upstream_timeout,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
