//! # Product Catalog API Gateway
//!
//! Stateless reverse proxy in front of the product service. Requests under
//! `/api/products` are forwarded with their method, query string and JSON
//! body; the upstream status, headers and body are relayed unchanged. The
//! only behavior of its own is the upstream timeout.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod proxy;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::GatewayError;
pub use proxy::{ForwardRequest, ProductProxy, PRODUCTS_BASE};

/// Proxy handler for `/api/products` and everything below it
pub async fn proxy_handler(
    State(proxy): State<ProductProxy>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let path = uri
        .path()
        .strip_prefix(PRODUCTS_BASE)
        .unwrap_or_default()
        .to_string();

    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        body: proxy::parse_body(&body),
    };

    proxy.forward(request).await
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

/// Build the Axum router
pub fn build_router(proxy: ProductProxy) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Proxied product routes
        .route(PRODUCTS_BASE, get(proxy_handler).post(proxy_handler))
        .route(
            &format!("{PRODUCTS_BASE}/{{*path}}"),
            get(proxy_handler).post(proxy_handler),
        )
        // State and middleware
        .with_state(proxy)
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
