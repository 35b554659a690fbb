//! # API Context
//!
//! Application state and dependency injection for request handlers.

use std::sync::Arc;

use catalog_persistence::{CacheSettings, ProductRepository, RecordStore, SharedCacheClient};

/// State shared by every handler. Holds injected clients only.
#[derive(Clone)]
pub struct ApiContext {
    /// Product repository (owns the record store and cache handles)
    pub products: Arc<ProductRepository>,
}

impl ApiContext {
    /// Create a new API context from explicitly constructed clients
    pub fn new(store: RecordStore, cache: SharedCacheClient, settings: CacheSettings) -> Self {
        Self {
            products: Arc::new(ProductRepository::with_settings(store, cache, settings)),
        }
    }

    /// Probe both backing stores.
    ///
    /// # Errors
    ///
    /// Returns the first failure: store connection/query, then cache ping.
    pub async fn readiness(&self) -> catalog_persistence::Result<()> {
        self.products.store().probe().await?;
        self.products.cache().ping().await?;
        Ok(())
    }
}
