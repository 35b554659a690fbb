//! # Strategy Module
//!
//! Enum-based cache/database access strategies using dispatch pattern.
//!
//! ## Available Strategies
//!
//! ### Read Strategies
//! - `CacheFirst` - Check cache, fall back to DB on miss and populate (default)
//! - `DbOnly` - Skip cache entirely
//!
//! ### Write Strategies
//! - `WriteAround` - Write DB only, then invalidate cache (default)
//! - `DbOnly` - Write DB only, no cache interaction
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_persistence::strategy::ReadStrategy;
//!
//! let products = ReadStrategy::CacheFirst
//!     .read(|| cache_lookup(), || db_query(), Some(|v| populate(v)))
//!     .await?;
//! ```

pub mod read_strategy;
pub mod write_strategy;

pub use read_strategy::ReadStrategy;
pub use write_strategy::WriteStrategy;
