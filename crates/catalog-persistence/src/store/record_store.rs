//! Retrying connection front-end for the record store.

use std::sync::Arc;
use std::time::Duration;

use super::{StoreConnection, StoreConnector};
use crate::error::{PersistenceError, Result};

/// Bounded connection retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// A single attempt with no delay
    #[must_use]
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Record store client.
///
/// Holds the connector, never a connection. Every call to [`Self::connect`]
/// opens a fresh connection that the caller owns and must close.
#[derive(Clone)]
pub struct RecordStore {
    connector: Arc<dyn StoreConnector>,
    policy: RetryPolicy,
}

impl RecordStore {
    pub fn new(connector: Arc<dyn StoreConnector>, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    /// Open a connection, retrying per the configured policy.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` once every attempt has failed.
    pub async fn connect(&self) -> Result<Box<dyn StoreConnection>> {
        self.connect_with(self.policy).await
    }

    async fn connect_with(&self, policy: RetryPolicy) -> Result<Box<dyn StoreConnection>> {
        let attempts = policy.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.connector.open().await {
                Ok(conn) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Record store connected after retry");
                    }
                    return Ok(conn);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Record store connection failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }

        tracing::error!(attempts, "Record store connection attempts exhausted");
        Err(PersistenceError::StoreUnavailable {
            attempts,
            reason: last_error,
        })
    }

    /// Readiness probe: one connection attempt and a `SELECT 1`.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the connection fails, `Store` if the query does.
    pub async fn probe(&self) -> Result<()> {
        let mut conn = self.connect_with(RetryPolicy::once()).await?;
        let result = conn.ping().await;
        conn.close().await;
        result
    }
}
