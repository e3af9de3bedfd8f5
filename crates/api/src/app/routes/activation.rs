//! Activation (authenticated) and activation-status reads (public).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use truetag_token::IdentityToken;

use crate::app::{AppServices, dto, errors};
use crate::context::CallerContext;

pub fn protected_router() -> Router {
    Router::new().route("/activation/activate", post(activate))
}

pub fn public_router() -> Router {
    Router::new().route("/activation/:token", get(get_status))
}

pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::ActivateRequest>,
) -> axum::response::Response {
    let token = IdentityToken::from(body.identity_token);

    match services.lifecycle.activate(&token, caller.user_id()).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Product activated successfully",
                "product": dto::ProductSummaryDto::from(summary),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    let token = IdentityToken::from(token);

    match services.lifecycle.get_status(&token).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({ "product": dto::ProductSummaryDto::from(summary) })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
