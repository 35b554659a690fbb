//! Write strategy implementations using enum dispatch.

use std::future::Future;

use crate::error::Result;

/// Write strategy enum - determines cache/db write pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Write to DB only, invalidate cache
    #[default]
    WriteAround,
    /// Write to DB only, no cache interaction
    DbOnly,
}

impl WriteStrategy {
    /// Execute a write operation according to the strategy.
    ///
    /// - `db_fn`: Async function to write to database
    /// - `invalidate_fn`: Async function to invalidate cache, run only after
    ///   a successful DB write. Its failure is logged, not returned.
    pub async fn write<T, DbFut, InvalidateFut>(
        &self,
        db_fn: impl FnOnce() -> DbFut,
        invalidate_fn: impl FnOnce() -> InvalidateFut,
    ) -> Result<T>
    where
        DbFut: Future<Output = Result<T>>,
        InvalidateFut: Future<Output = Result<()>>,
    {
        match self {
            Self::WriteAround => {
                // Write to DB only
                let written = db_fn().await?;

                // Invalidate cache
                if let Err(e) = invalidate_fn().await {
                    tracing::warn!(error = %e, "Failed to invalidate cache");
                }

                Ok(written)
            }

            Self::DbOnly => db_fn().await,
        }
    }
}
