//! Forwarding of product requests to the upstream product service.

use axum::body::{Body, Bytes};
use axum::http::Method;
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::GatewayError;

/// Product collection path, identical on the gateway and upstream
pub const PRODUCTS_BASE: &str = "/api/products";

/// An inbound request reduced to what gets forwarded
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path below [`PRODUCTS_BASE`], possibly empty
    pub path: String,
    /// Raw query string, forwarded unchanged
    pub query: Option<String>,
    /// JSON body when one was present and parseable
    pub body: Option<Value>,
}

/// Reverse proxy to the product service.
#[derive(Debug, Clone)]
pub struct ProductProxy {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ProductProxy {
    /// Create a proxy for `base_url` with a fixed per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Forward a request and relay the upstream response.
    ///
    /// Any upstream status, including 4xx/5xx, is relayed as a success.
    ///
    /// # Errors
    ///
    /// `UpstreamTimeout` when the timeout elapses, `UpstreamUnreachable` when
    /// the connection fails, `Upstream` for other transport failures.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn forward(&self, request: ForwardRequest) -> Result<Response, GatewayError> {
        let url = upstream_url(&self.base_url, &request.path, request.query.as_deref());
        info!(%url, "Proxying request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let upstream = builder.send().await.map_err(|e| self.classify(&e))?;

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let body = upstream.bytes().await.map_err(|e| self.classify(&e))?;
        debug!(%status, bytes = body.len(), "Upstream responded");

        let mut response = Response::builder().status(status);
        for (name, value) in &headers {
            if !is_hop_by_hop_header(name.as_str()) {
                response = response.header(name, value);
            }
        }

        response
            .body(Body::from(body))
            .map_err(|e| GatewayError::Internal(format!("Failed to build response: {e}")))
    }

    fn classify(&self, err: &reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout {
                timeout_ms: self.timeout.as_millis(),
            }
        } else if err.is_connect() {
            GatewayError::UpstreamUnreachable(err.to_string())
        } else {
            GatewayError::Upstream(err.to_string())
        }
    }
}

/// Build the upstream URL: base + [`PRODUCTS_BASE`] + optional `/<path>`
/// + optional `?<query>`.
#[must_use]
pub fn upstream_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}{PRODUCTS_BASE}", base_url.trim_end_matches('/'));

    let path = path.trim_start_matches('/');
    if !path.is_empty() {
        url.push('/');
        url.push_str(path);
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }

    url
}

/// Decode a request body as JSON. Absent or malformed bodies yield `None`.
#[must_use]
pub fn parse_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Headers that describe the upstream connection rather than the response.
/// The relayed body is re-framed, so these are not copied.
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url() {
        let base = "http://product-service:5000";
        assert_eq!(
            upstream_url(base, "", None),
            "http://product-service:5000/api/products"
        );
        assert_eq!(
            upstream_url(base, "/5", Some("color=red&size=m")),
            "http://product-service:5000/api/products/5?color=red&size=m"
        );
        assert_eq!(
            upstream_url("http://svc/", "category/home%20office", Some("")),
            "http://svc/api/products/category/home%20office"
        );
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(&Bytes::new()), None);
        assert_eq!(parse_body(&Bytes::from_static(b"name=x")), None);
        assert_eq!(
            parse_body(&Bytes::from_static(br#"{"name":"x"}"#)),
            Some(serde_json::json!({"name": "x"}))
        );
    }

    #[test]
    fn test_is_hop_by_hop_header() {
        assert!(is_hop_by_hop_header("Connection"));
        assert!(is_hop_by_hop_header("Transfer-Encoding"));
        assert!(!is_hop_by_hop_header("Content-Type"));
        assert!(!is_hop_by_hop_header("Content-Length"));
    }
}
