//! Route table for the product API.
//!
//! Resolution is a pure function of the method and the path below
//! `/api/products`, independent of the HTTP framework binding.

use axum::body::Bytes;
use axum::http::Method;
use serde_json::Value;

use crate::error::ApiError;
use catalog_domain::ProductId;

/// Mount point of the product collection
pub const PRODUCTS_BASE: &str = "/api/products";

/// A resolved product endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRoute {
    /// `GET /api/products`
    List,
    /// `POST /api/products`
    Create,
    /// `GET /api/products/<id>`
    Get(ProductId),
    /// `GET /api/products/category/<category>`
    ByCategory(String),
}

impl ProductRoute {
    /// Resolve a request against the route table.
    ///
    /// `rest` is the already-decoded path below [`PRODUCTS_BASE`], with or
    /// without a leading slash; empty for the collection itself.
    ///
    /// # Errors
    ///
    /// `RouteNotFound` for paths outside the table (including non-numeric
    /// ids), `MethodNotAllowed` for known paths with the wrong method.
    pub fn resolve(method: &Method, rest: &str) -> Result<Self, ApiError> {
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let segments: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let (allowed, route) = match segments.as_slice() {
            [] if *method == Method::POST => (Method::POST, Self::Create),
            [] => (Method::GET, Self::List),
            ["category", category] if !category.is_empty() => {
                (Method::GET, Self::ByCategory((*category).to_string()))
            }
            [id] => match parse_id(id) {
                Some(id) => (Method::GET, Self::Get(id)),
                None => return Err(ApiError::RouteNotFound),
            },
            _ => return Err(ApiError::RouteNotFound),
        };

        if *method == allowed {
            Ok(route)
        } else {
            Err(ApiError::MethodNotAllowed)
        }
    }
}

/// Unsigned decimal ids only; anything else is not a product path.
fn parse_id(segment: &str) -> Option<ProductId> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Decode a request body as JSON. Absent or malformed bodies yield `None`.
#[must_use]
pub fn parse_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}
