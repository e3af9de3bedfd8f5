//! Wire DTOs (camelCase, matching the mobile/web clients).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use truetag_core::{LabelRegion, ProductId, ReturnAttemptId, UserId};
use truetag_engine::{Product, ProductStatus, ProductSummary, ReturnAttempt, ReturnHistoryEntry};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterProductRequest {
    pub serial_number: String,
    pub name: String,
    pub brand: String,
    pub label_region: LabelRegionDto,
}

#[derive(Debug, Deserialize)]
pub struct LabelRegionDto {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRegionDto {
    pub fn into_domain(self) -> Result<LabelRegion, truetag_core::DomainError> {
        LabelRegion::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredProduct {
    pub id: ProductId,
    pub serial_number: String,
    pub identity_token: String,
    pub status: ProductStatus,
}

impl RegisteredProduct {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            serial_number: product.serial_number.clone(),
            identity_token: product.identity_token.as_str().to_string(),
            status: product.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub identity_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryDto {
    pub id: ProductId,
    pub serial_number: String,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl From<ProductSummary> for ProductSummaryDto {
    fn from(s: ProductSummary) -> Self {
        Self {
            id: s.id,
            serial_number: s.serial_number,
            status: s.status,
            activated_by: s.activated_by,
            activated_at: s.activated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub identity_token: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub status: ProductStatus,
    pub serial_number: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub label_match: Option<f64>,
    pub is_authentic: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequestBody {
    pub identity_token: String,
    pub reason: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResponse {
    pub message: String,
    pub trust_score: f64,
    pub approved: bool,
    pub return_id: ReturnAttemptId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAttemptDto {
    pub id: ReturnAttemptId,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub trust_score: f64,
    pub approved: bool,
    pub reason: String,
    pub degraded: bool,
}

impl From<ReturnAttempt> for ReturnAttemptDto {
    fn from(a: ReturnAttempt) -> Self {
        Self {
            id: a.id,
            user_id: a.requester_id,
            timestamp: a.timestamp,
            trust_score: a.trust_score.value(),
            approved: a.approved,
            reason: a.reason,
            degraded: a.degraded,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnHistoryDto {
    pub product_id: ProductId,
    pub serial_number: String,
    pub status: ProductStatus,
    pub return_attempts: Vec<ReturnAttemptDto>,
}

impl From<ReturnHistoryEntry> for ReturnHistoryDto {
    fn from(e: ReturnHistoryEntry) -> Self {
        Self {
            product_id: e.product_id,
            serial_number: e.serial_number,
            status: e.status,
            return_attempts: e.return_attempts.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

/// Full admin projection of a product, ledger included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub serial_number: String,
    pub name: String,
    pub brand: String,
    pub identity_token: String,
    pub status: ProductStatus,
    pub activated_by: Option<UserId>,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub return_attempts: Vec<ReturnAttemptDto>,
}

impl From<Product> for ProductDetail {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            serial_number: p.serial_number,
            name: p.name,
            brand: p.brand,
            identity_token: p.identity_token.as_str().to_string(),
            status: p.status,
            activated_by: p.activated_by,
            activated_at: p.activated_at,
            created_at: p.created_at,
            return_attempts: p.return_attempts.into_iter().map(Into::into).collect(),
        }
    }
}
