//! # Cache Module
//!
//! Key-value cache with per-key expiry, used by the product repository to
//! absorb listing reads.

#[cfg(feature = "redis")]
pub mod redis_client;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

#[cfg(feature = "redis")]
pub use redis_client::{CacheConfig, RedisCache};

/// Text key-value cache with expiry.
///
/// Values are opaque to the cache; callers choose the encoding.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Get a value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value that expires after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Round-trip to the cache server. Health reporting only.
    async fn ping(&self) -> Result<()>;
}

/// Shared cache client handle
pub type SharedCacheClient = Arc<dyn CacheClient>;

/// Wrap a cache client for sharing across handlers
pub fn shared_cache(client: impl CacheClient + 'static) -> SharedCacheClient {
    Arc::new(client)
}
