//! Read strategy implementations using enum dispatch.

use std::fmt::Debug;
use std::future::Future;

use crate::error::Result;

/// Read strategy enum - determines cache/db access pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Check cache first, fall back to DB on miss
    #[default]
    CacheFirst,
    /// Only read from database, skip cache
    DbOnly,
}

impl ReadStrategy {
    /// Execute a read operation according to the strategy.
    ///
    /// - `cache_fn`: Async function to read from cache
    /// - `db_fn`: Async function to read from database
    /// - `populate_fn`: Optional async function to populate cache after DB read
    ///
    /// Cache failures (lookup or populate) are logged and never fail the read.
    /// Database failures always do.
    pub async fn read<T, CacheFut, DbFut, PopulateFut>(
        &self,
        cache_fn: impl FnOnce() -> CacheFut,
        db_fn: impl FnOnce() -> DbFut,
        populate_fn: Option<impl FnOnce(T) -> PopulateFut>,
    ) -> Result<T>
    where
        T: Clone + Debug,
        CacheFut: Future<Output = Result<Option<T>>>,
        DbFut: Future<Output = Result<T>>,
        PopulateFut: Future<Output = Result<()>>,
    {
        match self {
            Self::CacheFirst => {
                // Try cache first
                match cache_fn().await {
                    Ok(Some(value)) => {
                        tracing::debug!("Cache hit");
                        return Ok(value);
                    }
                    Ok(None) => {
                        tracing::debug!("Cache miss, falling back to DB");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cache error, falling back to DB");
                    }
                }

                // Fall back to DB
                let value = db_fn().await?;

                // Populate cache on success
                if let Some(populate) = populate_fn {
                    if let Err(e) = populate(value.clone()).await {
                        tracing::warn!(error = %e, "Failed to populate cache");
                    }
                }

                Ok(value)
            }

            Self::DbOnly => db_fn().await,
        }
    }
}
