//! Admin product registration and inspection.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use truetag_engine::NewProduct;

use crate::app::{AppServices, dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register_product))
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

pub async fn register_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::RegisterProductRequest>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required");
    }

    let label_region = match body.label_region.into_domain() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let product = match services
        .lifecycle
        .register(NewProduct {
            serial_number: body.serial_number,
            name: body.name,
            brand: body.brand,
            label_region,
        })
        .await
    {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Product registered successfully",
            "product": dto::RegisteredProduct::from_product(&product),
        })),
    )
        .into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required");
    }

    let id: truetag_core::ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    match services.lifecycle.get_product(id).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::json!({ "product": dto::ProductDetail::from(product) })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required");
    }

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);

    match services
        .lifecycle
        .list_products(query.status, page, limit)
        .await
    {
        Ok(page) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "products": page
                    .products
                    .into_iter()
                    .map(dto::ProductDetail::from)
                    .collect::<Vec<_>>(),
                "totalPages": page.total_pages,
                "currentPage": page.current_page,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
