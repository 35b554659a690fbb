//! HTTP handlers. The axum binding extracts method, path and body, then
//! hands them to [`dispatch`].

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use crate::routes::{parse_body, ProductRoute};
use catalog_domain::NewProduct;

/// `/api/products`
pub async fn product_collection(
    State(ctx): State<ApiContext>,
    method: Method,
    body: Bytes,
) -> ApiResult<Response> {
    dispatch(&ctx, &method, "", &body).await
}

/// `/api/products/{*rest}`
pub async fn product_member(
    State(ctx): State<ApiContext>,
    method: Method,
    Path(rest): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    dispatch(&ctx, &method, &rest, &body).await
}

/// Resolve the route and run the matching product operation.
///
/// # Errors
///
/// Any [`ApiError`]; each maps to its own status code.
pub async fn dispatch(
    ctx: &ApiContext,
    method: &Method,
    rest: &str,
    body: &Bytes,
) -> ApiResult<Response> {
    let route = ProductRoute::resolve(method, rest)?;
    tracing::debug!(?route, "Dispatching product request");

    let response = match route {
        ProductRoute::List => Json(ctx.products.list_products().await?).into_response(),

        ProductRoute::Get(id) => {
            let product = ctx
                .products
                .get_product(id)
                .await?
                .ok_or(ApiError::ProductNotFound)?;
            Json(product).into_response()
        }

        ProductRoute::ByCategory(category) => {
            Json(ctx.products.list_by_category(&category).await?).into_response()
        }

        ProductRoute::Create => {
            let product = NewProduct::from_json(parse_body(body).as_ref())?;
            let id = ctx.products.create_product(&product).await?;
            (
                StatusCode::CREATED,
                Json(json!({ "status": "created", "id": id })),
            )
                .into_response()
        }
    };

    Ok(response)
}

/// Readiness check against the record store and the cache
pub async fn health_check(State(ctx): State<ApiContext>) -> Response {
    match ctx.readiness().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, format!("Not Ready: {e}")).into_response()
        }
    }
}

/// JSON 404 for anything outside the route table
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
