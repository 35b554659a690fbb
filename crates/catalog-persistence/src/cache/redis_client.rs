//! # Redis Cache Layer
//!
//! Redis implementation of [`CacheClient`].

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::CacheClient;
use crate::error::{PersistenceError, Result};

/// Reconnect attempts the connection manager makes before giving up
const CONNECT_RETRIES: usize = 1;

/// Redis cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single cache operation, connecting included
    pub timeout: Duration,
}

impl CacheConfig {
    /// Connection URL for the configured server
    #[must_use]
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "redis".to_string(),
            port: 6379,
            timeout: Duration::from_millis(500),
        }
    }
}

/// Redis cache client.
///
/// The connection manager is created on first use, so an unreachable
/// server at startup only degrades reads to cache misses. Every operation
/// is bounded by [`CacheConfig::timeout`]; a failed connect is not
/// remembered and the next operation dials again.
pub struct RedisCache {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisCache {
    /// Create a new cache client. Does not connect.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is malformed.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let client = Client::open(config.url())?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            timeout: config.timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                tracing::debug!("Opening Redis connection manager");
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_connection_timeout(self.timeout)
                    .set_response_timeout(self.timeout);
                ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await?;
        Ok(conn.clone())
    }

    async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(PersistenceError::CacheUnavailable(format!(
                "no reply within {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, PersistenceError>(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            Ok::<_, PersistenceError>(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let deleted: i64 = conn.del(key).await?;
            Ok::<_, PersistenceError>(deleted > 0)
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, PersistenceError>(())
        })
        .await
    }
}
