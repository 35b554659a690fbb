//! Gateway-specific error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Forwarding failures. Upstream error responses are not errors here;
/// they are relayed as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Upstream timed out after {timeout_ms}ms")]
    UpstreamTimeout { timeout_ms: u128 },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnreachable(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Forwarding failed");
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
