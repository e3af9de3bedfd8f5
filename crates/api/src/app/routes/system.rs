//! Health/system routes.

use axum::{Json, Router, routing::get};

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "truetag-api",
    }))
}
