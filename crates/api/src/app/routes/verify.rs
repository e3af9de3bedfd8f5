//! Public verification scans.

use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::post,
};

use truetag_token::IdentityToken;

use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new().route("/verify/scan", post(scan))
}

pub async fn scan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ScanRequest>,
) -> axum::response::Response {
    let token = IdentityToken::from(body.identity_token);

    match services.verifier.verify(&token, body.image).await {
        Ok(result) => (
            StatusCode::OK,
            Json(dto::ScanResponse {
                status: result.status,
                serial_number: result.serial_number,
                activated_at: result.activated_at,
                label_match: result.label_match_score,
                is_authentic: result.is_authentic,
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
