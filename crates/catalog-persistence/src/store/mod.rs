//! # Record Store Module
//!
//! Connections to the durable product store. Each logical operation opens
//! its own connection through [`RecordStore::connect`] and closes it before
//! returning; connections are never pooled or shared.

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod record_store;

use async_trait::async_trait;

use crate::error::Result;
use catalog_domain::{NewProduct, Product, ProductId};

#[cfg(feature = "postgres")]
pub use postgres::{PgConnector, StoreConfig};
pub use record_store::{RecordStore, RetryPolicy};

/// An open connection to the record store.
///
/// Owned by exactly one caller. `close` must be called on every exit path.
#[async_trait]
pub trait StoreConnection: Send {
    /// All products, in storage order
    async fn fetch_products(&mut self) -> Result<Vec<Product>>;

    /// A single product by id
    async fn fetch_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Products whose category equals `category`
    async fn fetch_by_category(&mut self, category: &str) -> Result<Vec<Product>>;

    /// Insert a product inside a transaction and return the generated id.
    /// Nothing is visible to other connections until [`Self::commit`].
    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductId>;

    /// Commit the open transaction
    async fn commit(&mut self) -> Result<()>;

    /// Trivial round-trip query
    async fn ping(&mut self) -> Result<()>;

    /// Release the connection. Uncommitted work is discarded.
    async fn close(self: Box<Self>);
}

/// Opens a single connection, without retrying.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn StoreConnection>>;
}
