//! Return requests and return history.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use truetag_token::IdentityToken;

use crate::app::{AppServices, dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/request", post(request_return))
        .route("/history", get(get_history))
}

pub async fn request_return(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::ReturnRequestBody>,
) -> axum::response::Response {
    let token = IdentityToken::from(body.identity_token);

    match services
        .arbitrator
        .request_return(&token, caller.user_id(), body.reason, body.image)
        .await
    {
        Ok(outcome) => {
            let message = if outcome.approved {
                "Return approved"
            } else {
                "Return requires review"
            };
            (
                StatusCode::OK,
                Json(dto::ReturnResponse {
                    message: message.to_string(),
                    trust_score: outcome.trust_score.value(),
                    approved: outcome.approved,
                    return_id: outcome.return_attempt_id,
                }),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.arbitrator.get_return_history(caller.user_id()).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "returns": entries
                    .into_iter()
                    .map(dto::ReturnHistoryDto::from)
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
