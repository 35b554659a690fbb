//! # API Error Types
//!
//! Unified error handling for the product service HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_domain::DomainError;
use catalog_persistence::PersistenceError;
use thiserror::Error;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing fields")]
    MissingFields,

    #[error("Invalid fields")]
    InvalidFields(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ProductNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingFields | Self::InvalidFields(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingFields => Self::MissingFields,
            DomainError::InvalidFields(detail) => Self::InvalidFields(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Persistence(e) => tracing::error!(error = %e, "Request failed"),
            Self::InvalidFields(detail) => tracing::debug!(%detail, "Rejected product body"),
            _ => {}
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::ProductNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(PersistenceError::StoreUnavailable {
                attempts: 5,
                reason: "refused".into()
            })
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(PersistenceError::Store("syntax".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
