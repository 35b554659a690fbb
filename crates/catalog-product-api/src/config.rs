//! # Service Configuration
//!
//! Environment-based configuration for the product service.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use catalog_persistence::{CacheConfig, CacheSettings, RetryPolicy, StoreConfig};

/// Rejected configuration value
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Product service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// PostgreSQL connection settings
    pub store: StoreConfig,

    /// Connection retry policy for the record store
    pub store_retry: RetryPolicy,

    /// Redis connection settings
    pub cache: CacheConfig,

    /// Listing cache behavior
    pub cache_settings: CacheSettings,

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
        let store_defaults = StoreConfig::default();
        let retry_defaults = RetryPolicy::default();
        let cache_defaults = CacheConfig::default();
        let settings_defaults = CacheSettings::default();

        Ok(Self {
            server_addr: parse_or(&lookup, "SERVER_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?,

            store: StoreConfig {
                host: lookup("DB_HOST").unwrap_or(store_defaults.host),
                port: parse_or(&lookup, "DB_PORT", store_defaults.port)?,
                database: lookup("POSTGRES_DB").unwrap_or(store_defaults.database),
                username: lookup("POSTGRES_USER").unwrap_or(store_defaults.username),
                password: lookup("POSTGRES_PASSWORD").unwrap_or(store_defaults.password),
            },

            store_retry: RetryPolicy {
                attempts: parse_or(&lookup, "DB_CONNECT_ATTEMPTS", retry_defaults.attempts)?,
                delay: Duration::from_secs(parse_or(
                    &lookup,
                    "DB_RETRY_DELAY_SECS",
                    retry_defaults.delay.as_secs(),
                )?),
            },

            cache: CacheConfig {
                host: lookup("REDIS_HOST").unwrap_or(cache_defaults.host),
                port: parse_or(&lookup, "REDIS_PORT", cache_defaults.port)?,
                timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "REDIS_TIMEOUT_MS",
                    u64::try_from(cache_defaults.timeout.as_millis()).unwrap_or(500),
                )?),
            },

            cache_settings: CacheSettings {
                enabled: parse_flag(&lookup, "PRODUCTS_CACHE_ENABLED", settings_defaults.enabled)?,
                listing_ttl: Duration::from_secs(parse_or(
                    &lookup,
                    "PRODUCTS_CACHE_TTL_SECS",
                    settings_defaults.listing_ttl.as_secs(),
                )?),
            },

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError { name, value }),
        },
        None => Ok(default),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(name).as_deref().map(str::trim) {
        None => Ok(default),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(ConfigError {
            name,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 5000);
        assert_eq!(config.store.host, "postgres");
        assert_eq!(config.store.database, "ecommerce");
        assert_eq!(config.cache.url(), "redis://redis:6379");
        assert_eq!(config.cache.timeout, Duration::from_millis(500));
        assert_eq!(config.store_retry, RetryPolicy::default());
        assert!(config.cache_settings.enabled);
        assert_eq!(config.cache_settings.listing_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DB_HOST", "db.local"),
            ("POSTGRES_DB", "shop"),
            ("REDIS_PORT", "6380"),
            ("REDIS_TIMEOUT_MS", "250"),
            ("DB_CONNECT_ATTEMPTS", "2"),
            ("DB_RETRY_DELAY_SECS", "1"),
            ("PRODUCTS_CACHE_ENABLED", "false"),
        ])
        .unwrap();

        assert_eq!(config.store.host, "db.local");
        assert_eq!(config.store.database, "shop");
        assert_eq!(config.cache.port, 6380);
        assert_eq!(config.cache.timeout, Duration::from_millis(250));
        assert_eq!(config.store_retry.attempts, 2);
        assert_eq!(config.store_retry.delay, Duration::from_secs(1));
        assert!(!config.cache_settings.enabled);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let err = config_from(&[("REDIS_PORT", "not-a-port")]).unwrap_err();
        assert_eq!(err.name, "REDIS_PORT");
        assert_eq!(err.value, "not-a-port");
    }
}
