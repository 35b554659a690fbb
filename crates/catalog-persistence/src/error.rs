//! Persistence layer error types

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Connection retries exhausted. Terminal for the current request.
    #[error("Record store unavailable after {attempts} attempt(s): {reason}")]
    StoreUnavailable { attempts: u32, reason: String },

    /// A statement failed on an established connection
    #[error("Record store error: {0}")]
    Store(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PersistenceError {
    /// Whether this error means the store could not be reached at all
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for PersistenceError {
    fn from(err: redis::RedisError) -> Self {
        Self::CacheUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
