//! # Catalog Persistence Library
//!
//! Persistence layer for the product catalog service.
//!
//! ## Architecture
//!
//! This crate implements the Repository pattern with enum-dispatched
//! strategies for cache/database access:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Product Service API                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ProductRepository                         │
//! │        (CacheFirst listing reads, WriteAround creates)       │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │     Redis Cache         │   │   PostgreSQL RecordStore     │
//! │  ("products" listing)   │   │ (per-operation connections)  │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `postgres`: Enable the PostgreSQL record store (default)
//! - `redis`: Enable the Redis cache client (default)
//! - `testing`: Export in-memory fakes of both for downstream tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_persistence::{
//!     shared_cache, CacheConfig, PgConnector, ProductRepository, RecordStore,
//!     RedisCache, RetryPolicy, StoreConfig,
//! };
//!
//! let store = RecordStore::new(
//!     Arc::new(PgConnector::new(&StoreConfig::default())),
//!     RetryPolicy::default(),
//! );
//! let cache = shared_cache(RedisCache::new(&CacheConfig::default())?);
//!
//! let repo = ProductRepository::new(store, cache);
//! let products = repo.list_products().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod repository;
pub mod store;
pub mod strategy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use cache::{shared_cache, CacheClient, SharedCacheClient};
#[cfg(feature = "redis")]
pub use cache::{CacheConfig, RedisCache};
pub use error::{PersistenceError, Result};
pub use repository::{CacheSettings, ProductRepository, PRODUCTS_CACHE_KEY};
pub use store::{RecordStore, RetryPolicy, StoreConnection, StoreConnector};
#[cfg(feature = "postgres")]
pub use store::{PgConnector, StoreConfig};
pub use strategy::{ReadStrategy, WriteStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
