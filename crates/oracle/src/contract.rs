//! Oracle request/response contracts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use truetag_core::{LabelRegion, ProductId, TrustScore, UserId};

/// Failure of an oracle call.
///
/// Callers treat every variant as "oracle unavailable": the distinction only
/// matters for operator-facing logs, never for control flow.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle call timed out")]
    Timeout,

    #[error("oracle returned status {0}")]
    Status(u16),

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle response malformed: {0}")]
    Malformed(String),
}

/// Input to a trust scoring request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustRequest {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub activation_time: DateTime<Utc>,
    /// Count of *prior* return attempts on the product.
    pub return_attempts: usize,
    /// Base64-encoded evidence image, when the requester supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Trust oracle verdict.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustResponse {
    pub trust_score: f64,
}

impl TrustResponse {
    /// Validate the raw wire value into a domain score.
    pub fn score(&self) -> Result<TrustScore, OracleError> {
        TrustScore::new(self.trust_score)
            .map_err(|e| OracleError::Malformed(e.to_string()))
    }
}

/// Input to a label placement check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub product_id: ProductId,
    /// Base64-encoded photograph of the product.
    pub image: String,
    pub expected_coordinates: LabelRegion,
}

/// Label oracle verdict.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub score: f64,
}

/// Scores the legitimacy of a return request.
#[async_trait]
pub trait TrustOracle: Send + Sync {
    async fn score_return(&self, request: TrustRequest) -> Result<TrustScore, OracleError>;
}

/// Scores how well a photographed label matches its expected region.
#[async_trait]
pub trait LabelOracle: Send + Sync {
    async fn score_label(&self, request: LabelRequest) -> Result<f64, OracleError>;
}
