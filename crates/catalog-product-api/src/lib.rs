//! # Product Catalog Service
//!
//! HTTP product service backed by PostgreSQL with a Redis cache in front of
//! the full product listing.
//!
//! ## Endpoints
//!
//! - `GET /health` - store + cache readiness probe
//! - `GET /api/products` - full listing (cache-aside)
//! - `GET /api/products/{id}` - single product (store only)
//! - `GET /api/products/category/{category}` - products in a category (store only)
//! - `POST /api/products` - create a product, invalidating the cached listing

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod routes;

use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use context::ApiContext;
pub use error::{ApiError, ApiResult};
pub use routes::{ProductRoute, PRODUCTS_BASE};

/// Build the Axum router
pub fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product endpoints, resolved by the route table
        .route(PRODUCTS_BASE, any(handlers::product_collection))
        .route(
            &format!("{PRODUCTS_BASE}/{{*rest}}"),
            any(handlers::product_member),
        )
        .fallback(handlers::not_found)
        // State and middleware
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use catalog_domain::NewProduct;
    use catalog_persistence::testing::{FakeStore, InMemoryCache};
    use catalog_persistence::{
        shared_cache, CacheConfig, CacheSettings, RecordStore, RedisCache, RetryPolicy,
        PRODUCTS_CACHE_KEY,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        store: FakeStore,
        cache: Arc<InMemoryCache>,
    }

    fn harness() -> Harness {
        let store = FakeStore::with_products([
            NewProduct::new("Desk Lamp", "home", 24.5),
            NewProduct::new("Trowel", "garden", 9.99),
        ]);
        let cache = Arc::new(InMemoryCache::new());
        let record_store = RecordStore::new(
            Arc::new(store.clone()),
            RetryPolicy {
                attempts: 2,
                delay: Duration::from_millis(5),
            },
        );
        let ctx = ApiContext::new(record_store, cache.clone(), CacheSettings::default());

        Harness {
            router: build_router(ctx),
            store,
            cache,
        }
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_is_cached_between_calls() {
        let h = harness();

        let (status, first) = send(&h.router, "GET", "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = send(&h.router, "GET", "/api/products", None).await;

        assert_eq!(first, second);
        assert_eq!(json_of(&first).as_array().unwrap().len(), 2);
        assert_eq!(h.store.listing_queries(), 1);
        assert!(h.cache.contains(PRODUCTS_CACHE_KEY));
    }

    #[tokio::test]
    async fn test_get_product() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/api/products/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_of(&body),
            json!({"id": 2, "name": "Trowel", "category": "garden", "price": 9.99})
        );
        assert!(json_of(&body)["price"].is_f64());
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/api/products/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body), json!({"error": "Product not found"}));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/api/products/category/garden", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body).as_array().unwrap().len(), 1);

        let (status, body) = send(&h.router, "GET", "/api/products/category/toys", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([]));
    }

    #[tokio::test]
    async fn test_create_then_list_reflects_new_product() {
        let h = harness();
        send(&h.router, "GET", "/api/products", None).await;

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/products",
            Some(json!({"name": "Rake", "category": "garden", "price": 15})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json_of(&body), json!({"status": "created", "id": 3}));

        let (_, body) = send(&h.router, "GET", "/api/products", None).await;
        let listing = json_of(&body);
        assert!(listing
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["id"] == 3 && p["name"] == "Rake"));
    }

    #[tokio::test]
    async fn test_create_missing_price_touches_nothing() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/products",
            Some(json!({"name": "Rake", "category": "garden"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body), json!({"error": "Missing fields"}));
        assert_eq!(h.store.connections_opened(), 0);
        assert_eq!(h.store.rows().len(), 2);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[tokio::test]
    async fn test_create_without_body() {
        let h = harness();

        let (status, body) = send(&h.router, "POST", "/api/products", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body), json!({"error": "Missing fields"}));
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/api/products/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body), json!({"error": "Not found"}));

        let (status, _) = send(&h.router, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&h.router, "DELETE", "/api/products/1", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_unavailable_is_503() {
        let h = harness();
        h.store.fail_next_connects(2);

        let (status, body) = send(&h.router, "GET", "/api/products/1", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json_of(&body)["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_query_failure_is_500() {
        let h = harness();
        h.store.fail_queries(true);

        let (status, _) = send(&h.router, "GET", "/api/products", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(h.store.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        h.cache.set_unavailable(true);
        let (status, body) = send(&h.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(String::from_utf8(body).unwrap().starts_with("Not Ready:"));

        h.cache.set_unavailable(false);
        h.store.fail_next_connects(1);
        let (status, _) = send(&h.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_with_unreachable_redis_answers_promptly() {
        let store = FakeStore::with_products([NewProduct::new("Desk Lamp", "home", 24.5)]);
        let cache = shared_cache(
            RedisCache::new(&CacheConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                timeout: Duration::from_millis(200),
            })
            .unwrap(),
        );
        let record_store = RecordStore::new(Arc::new(store.clone()), RetryPolicy::once());
        let router = build_router(ApiContext::new(record_store, cache, CacheSettings::default()));
        let started = std::time::Instant::now();

        let (status, _) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(&router, "GET", "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body).as_array().unwrap().len(), 1);

        let product = json!({"name": "Rake", "category": "garden", "price": 15.0});
        let (status, _) = send(&router, "POST", "/api/products", Some(product)).await;
        assert_eq!(status, StatusCode::CREATED);

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
