//! # Repository Module
//!
//! Repository pattern implementations for product persistence.

pub mod product;

pub use product::{CacheSettings, ProductRepository, PRODUCTS_CACHE_KEY};
