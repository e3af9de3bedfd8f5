//! Verification scan (read path).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use truetag_core::{DomainError, DomainResult};
use truetag_oracle::{LabelOracle, LabelRequest};
use truetag_token::IdentityToken;

use crate::product::ProductStatus;
use crate::repository::ProductRepository;

/// Result of a verification scan.
///
/// `is_authentic` means "the token resolves to a known product" — it is not
/// by itself a counterfeiting verdict. The label match, when present, is a
/// supplementary signal the caller may weigh independently.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub status: ProductStatus,
    pub serial_number: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub label_match_score: Option<f64>,
    pub is_authentic: bool,
}

/// Read-only verification: token lookup plus an optional label check.
pub struct Verifier {
    repository: Arc<dyn ProductRepository>,
    label_oracle: Arc<dyn LabelOracle>,
}

impl Verifier {
    pub fn new(repository: Arc<dyn ProductRepository>, label_oracle: Arc<dyn LabelOracle>) -> Self {
        Self {
            repository,
            label_oracle,
        }
    }

    /// Verify a scanned token; never mutates state.
    ///
    /// Existence/status verification must not depend on the label oracle:
    /// when the oracle fails, the scan completes without a label score.
    pub async fn verify(
        &self,
        token: &IdentityToken,
        evidence_image: Option<String>,
    ) -> DomainResult<VerificationResult> {
        let product = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::NotFound)?;

        let label_match_score = match evidence_image {
            Some(image) => {
                let request = LabelRequest {
                    product_id: product.id,
                    image,
                    expected_coordinates: product.label_region,
                };
                match self.label_oracle.score_label(request).await {
                    Ok(score) => Some(score),
                    Err(e) => {
                        tracing::warn!(
                            product_id = %product.id,
                            error = %e,
                            "label oracle unavailable, verifying without label score"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        Ok(VerificationResult {
            status: product.status,
            serial_number: product.serial_number,
            activated_at: product.activated_at,
            label_match_score,
            is_authentic: true,
        })
    }
}
