//! HTTP client for the scoring service.
//!
//! The trust and label oracles are two endpoints of one inference service
//! (`/analyze/trust`, `/analyze/label`), so a single client implements both
//! contracts.

use std::time::Duration;

use async_trait::async_trait;

use truetag_core::TrustScore;

use crate::contract::{
    LabelOracle, LabelRequest, LabelResponse, OracleError, TrustOracle, TrustRequest,
    TrustResponse,
};

/// Default per-call deadline for oracle requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Oracle client over HTTP with a bounded per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpOracleClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOracleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, OracleError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TrustOracle for HttpOracleClient {
    async fn score_return(&self, request: TrustRequest) -> Result<TrustScore, OracleError> {
        let response: TrustResponse = self.post_json("/analyze/trust", &request).await?;
        response.score()
    }
}

#[async_trait]
impl LabelOracle for HttpOracleClient {
    async fn score_label(&self, request: LabelRequest) -> Result<f64, OracleError> {
        let response: LabelResponse = self.post_json("/analyze/label", &request).await?;
        Ok(response.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use chrono::Utc;
    use truetag_core::{LabelRegion, ProductId, UserId};

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn trust_request() -> TrustRequest {
        TrustRequest {
            product_id: ProductId::new(),
            user_id: UserId::new(),
            activation_time: Utc::now(),
            return_attempts: 0,
            image: None,
        }
    }

    #[tokio::test]
    async fn trust_call_parses_score() {
        let app = Router::new().route(
            "/analyze/trust",
            post(|| async { Json(serde_json::json!({ "trustScore": 0.82 })) }),
        );
        let base = spawn_stub(app).await;

        let client = HttpOracleClient::new(base, DEFAULT_TIMEOUT).unwrap();
        let score = client.score_return(trust_request()).await.unwrap();
        assert!((score.value() - 0.82).abs() < 1e-9);
    }

    #[tokio::test]
    async fn non_2xx_maps_to_status_error() {
        let app = Router::new().route(
            "/analyze/trust",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_stub(app).await;

        let client = HttpOracleClient::new(base, DEFAULT_TIMEOUT).unwrap();
        let err = client.score_return(trust_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Status(500)));
    }

    #[tokio::test]
    async fn out_of_range_score_is_malformed() {
        let app = Router::new().route(
            "/analyze/trust",
            post(|| async { Json(serde_json::json!({ "trustScore": 7.5 })) }),
        );
        let base = spawn_stub(app).await;

        let client = HttpOracleClient::new(base, DEFAULT_TIMEOUT).unwrap();
        let err = client.score_return(trust_request()).await.unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[tokio::test]
    async fn label_call_parses_score() {
        let app = Router::new().route(
            "/analyze/label",
            post(|| async { Json(serde_json::json!({ "score": 0.65 })) }),
        );
        let base = spawn_stub(app).await;

        let client = HttpOracleClient::new(base, DEFAULT_TIMEOUT).unwrap();
        let score = client
            .score_label(LabelRequest {
                product_id: ProductId::new(),
                image: "aGVsbG8=".to_string(),
                expected_coordinates: LabelRegion::new(0.0, 0.0, 100.0, 50.0).unwrap(),
            })
            .await
            .unwrap();
        assert!((score - 0.65).abs() < 1e-9);
    }
}
