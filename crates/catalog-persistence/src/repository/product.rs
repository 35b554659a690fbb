//! Product repository: cache-aside listing over per-operation connections.

use std::time::Duration;

use crate::cache::SharedCacheClient;
use crate::error::Result;
use crate::store::RecordStore;
use crate::strategy::{ReadStrategy, WriteStrategy};
use catalog_domain::{NewProduct, Product, ProductId};

/// Cache key holding the JSON-encoded full product listing
pub const PRODUCTS_CACHE_KEY: &str = "products";

/// Listing cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub listing_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            listing_ttl: Duration::from_secs(60),
        }
    }
}

/// Repository for product reads and writes.
///
/// Only the full listing goes through the cache. Single-product and
/// category lookups always hit the record store and are never cached.
pub struct ProductRepository {
    store: RecordStore,
    cache: SharedCacheClient,
    read_strategy: ReadStrategy,
    write_strategy: WriteStrategy,
    listing_ttl: Duration,
}

impl ProductRepository {
    /// Create a new product repository with default strategies.
    pub fn new(store: RecordStore, cache: SharedCacheClient) -> Self {
        Self::with_settings(store, cache, CacheSettings::default())
    }

    /// Create with explicit cache settings. A disabled cache selects the
    /// `DbOnly` strategies for both reads and writes.
    pub fn with_settings(
        store: RecordStore,
        cache: SharedCacheClient,
        settings: CacheSettings,
    ) -> Self {
        let (read_strategy, write_strategy) = if settings.enabled {
            (ReadStrategy::CacheFirst, WriteStrategy::WriteAround)
        } else {
            (ReadStrategy::DbOnly, WriteStrategy::DbOnly)
        };

        Self {
            store,
            cache,
            read_strategy,
            write_strategy,
            listing_ttl: settings.listing_ttl,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    #[must_use]
    pub fn cache(&self) -> &SharedCacheClient {
        &self.cache
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Full product listing, served from the cache when present.
    ///
    /// # Errors
    ///
    /// Fails only on record store errors; cache errors degrade to a miss.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.read_strategy
            .read(
                || self.cached_listing(),
                || self.query_all(),
                Some(|products: Vec<Product>| self.populate_listing(products)),
            )
            .await
    }

    /// Single product by id, straight from the record store.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store is unavailable or the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let mut conn = self.store.connect().await?;
        let result = conn.fetch_product(id).await;
        conn.close().await;
        result
    }

    /// Products in `category`, straight from the record store. Empty when
    /// nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store is unavailable or the query fails.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let mut conn = self.store.connect().await?;
        let result = conn.fetch_by_category(category).await;
        conn.close().await;
        result
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Insert and commit a product, then invalidate the cached listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or commit fails. Invalidation failures
    /// are logged only.
    pub async fn create_product(&self, product: &NewProduct) -> Result<ProductId> {
        let id = self
            .write_strategy
            .write(|| self.insert(product), || self.invalidate_listing())
            .await?;

        tracing::info!(id, name = %product.name, category = %product.category, "Product created");
        Ok(id)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn query_all(&self) -> Result<Vec<Product>> {
        let mut conn = self.store.connect().await?;
        let result = conn.fetch_products().await;
        conn.close().await;
        result
    }

    async fn insert(&self, product: &NewProduct) -> Result<ProductId> {
        let mut conn = self.store.connect().await?;
        let result: Result<ProductId> = async {
            let id = conn.insert_product(product).await?;
            conn.commit().await?;
            Ok(id)
        }
        .await;
        conn.close().await;
        result
    }

    async fn cached_listing(&self) -> Result<Option<Vec<Product>>> {
        match self.cache.get(PRODUCTS_CACHE_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn populate_listing(&self, products: Vec<Product>) -> Result<()> {
        let json = serde_json::to_string(&products)?;
        self.cache
            .set(PRODUCTS_CACHE_KEY, &json, self.listing_ttl)
            .await
    }

    async fn invalidate_listing(&self) -> Result<()> {
        let existed = self.cache.delete(PRODUCTS_CACHE_KEY).await?;
        tracing::debug!(existed, "Product listing invalidated");
        Ok(())
    }
}
