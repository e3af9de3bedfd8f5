//! Domain-error → HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};

use truetag_core::DomainError;

pub fn json_error(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a domain failure onto the wire.
///
/// Expected outcomes keep their shape; anything unexpected becomes an opaque
/// 500 with full detail retained in the trace, not the response body.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DomainError::AlreadyActivated => json_error(
            StatusCode::BAD_REQUEST,
            "already_activated",
            "Product already activated",
        ),
        DomainError::NotOwner => json_error(
            StatusCode::FORBIDDEN,
            "not_owner",
            "Not authorized to return this product",
        ),
        DomainError::NotReturnable => json_error(
            StatusCode::CONFLICT,
            "not_returnable",
            "Product is not in a returnable state",
        ),
        DomainError::DuplicateKey(_) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate",
            "Serial number or token already exists",
        ),
        DomainError::Validation(ref msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation", msg.clone())
        }
        DomainError::ConcurrencyConflict(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "conflict",
            "Concurrent modification, please retry",
        ),
        DomainError::Configuration(_) => {
            tracing::error!(error = %err, "configuration error surfaced at request time");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal error",
            )
        }
    }
}
