//! Return arbitration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use truetag_core::{DomainError, DomainResult, ProductId, ReturnAttemptId, TrustScore, UserId};
use truetag_oracle::{TrustOracle, TrustRequest};
use truetag_token::IdentityToken;

use crate::config::EngineConfig;
use crate::product::{Product, ProductStatus, ReturnAttempt};
use crate::repository::{ProductRepository, RepositoryError};

/// Outcome of an arbitrated return request.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnOutcome {
    pub approved: bool,
    pub trust_score: TrustScore,
    pub return_attempt_id: ReturnAttemptId,
    /// The score is the fixed fallback because the oracle was unavailable.
    pub degraded: bool,
}

/// One product in a requester's return history.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnHistoryEntry {
    pub product_id: ProductId,
    pub serial_number: String,
    pub status: ProductStatus,
    pub return_attempts: Vec<ReturnAttempt>,
}

/// Decides returns: consults the trust oracle, applies the threshold,
/// appends to the per-product ledger, and drives the terminal transition.
pub struct ReturnArbitrator {
    repository: Arc<dyn ProductRepository>,
    trust_oracle: Arc<dyn TrustOracle>,
    config: EngineConfig,
}

impl ReturnArbitrator {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        trust_oracle: Arc<dyn TrustOracle>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            trust_oracle,
            config,
        }
    }

    /// Arbitrate one return request.
    ///
    /// Every attempt that reaches arbitration is recorded, approved or not.
    /// Oracle unavailability is absorbed into the fallback score; it is never
    /// surfaced to the caller as an error. The ledger append (plus the
    /// terminal flip when approved) is a single compare-and-set write,
    /// retried on conflict so concurrent attempts are all recorded and none
    /// overwrite each other.
    pub async fn request_return(
        &self,
        token: &IdentityToken,
        requester_id: UserId,
        reason: String,
        evidence_image: Option<String>,
    ) -> DomainResult<ReturnOutcome> {
        if reason.trim().is_empty() {
            return Err(DomainError::validation("return reason must not be empty"));
        }

        let mut product = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::NotFound)?;

        // A never-activated product has no owner, so this also covers it.
        if !product.is_owned_by(requester_id) {
            return Err(DomainError::NotOwner);
        }
        if product.status != ProductStatus::Activated {
            return Err(DomainError::NotReturnable);
        }

        // `activated_at` is present whenever status is Activated.
        let activated_at = product
            .activated_at
            .ok_or_else(|| DomainError::validation("activated product missing activation time"))?;

        let (trust_score, degraded) = self
            .consult_oracle(product.id, requester_id, activated_at, &product, evidence_image)
            .await;

        let approved = trust_score.meets(self.config.approval_threshold);
        let attempt = ReturnAttempt {
            id: ReturnAttemptId::new(),
            requester_id,
            timestamp: Utc::now(),
            trust_score,
            approved,
            reason,
            degraded,
        };

        // Oracle consulted exactly once per request; conflicts only re-run
        // the load/append/save cycle, never the scoring.
        let mut retries = 0;
        loop {
            let loaded_version = product.version;
            let mut candidate = product.clone();
            candidate.record_return_attempt(attempt.clone())?;

            match self.repository.save(&candidate, loaded_version).await {
                Ok(()) => {
                    tracing::info!(
                        product_id = %candidate.id,
                        requester_id = %requester_id,
                        trust_score = %trust_score,
                        approved,
                        degraded,
                        "return attempt recorded"
                    );
                    return Ok(ReturnOutcome {
                        approved,
                        trust_score,
                        return_attempt_id: attempt.id,
                        degraded,
                    });
                }
                Err(RepositoryError::VersionConflict { .. }) => {
                    retries += 1;
                    if retries > self.config.max_save_retries {
                        return Err(DomainError::conflict(format!(
                            "return attempt on {} lost {} compare-and-set races",
                            candidate.id, retries
                        )));
                    }
                    product = self
                        .repository
                        .find_by_token(token)
                        .await?
                        .ok_or(DomainError::NotFound)?;
                    if !product.is_owned_by(requester_id) {
                        return Err(DomainError::NotOwner);
                    }
                    // A concurrent approved return flips the status; the
                    // next `record_return_attempt` rejects with NotReturnable.
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Products with at least one attempt by `requester`, most recent
    /// attempt first. Ties are broken by attempt insertion order (later
    /// insertion sorts first), making the order total and stable.
    pub async fn get_return_history(
        &self,
        requester_id: UserId,
    ) -> DomainResult<Vec<ReturnHistoryEntry>> {
        let mut products = self.repository.find_with_attempts_by(requester_id).await?;

        products.sort_by(|a, b| latest_attempt_key(b).cmp(&latest_attempt_key(a)));

        Ok(products
            .into_iter()
            .map(|p| ReturnHistoryEntry {
                product_id: p.id,
                serial_number: p.serial_number,
                status: p.status,
                return_attempts: p.return_attempts,
            })
            .collect())
    }

    async fn consult_oracle(
        &self,
        product_id: ProductId,
        requester_id: UserId,
        activated_at: DateTime<Utc>,
        product: &Product,
        evidence_image: Option<String>,
    ) -> (TrustScore, bool) {
        let request = TrustRequest {
            product_id,
            user_id: requester_id,
            activation_time: activated_at,
            return_attempts: product.return_attempts.len(),
            image: evidence_image,
        };

        match self.trust_oracle.score_return(request).await {
            Ok(score) => (score, false),
            Err(e) => {
                // Documented availability-over-correctness branch: the
                // return path completes on a neutral score instead of
                // failing with the oracle.
                tracing::warn!(
                    product_id = %product_id,
                    error = %e,
                    fallback = %TrustScore::FALLBACK,
                    "trust oracle unavailable, applying fallback score"
                );
                (TrustScore::FALLBACK, true)
            }
        }
    }
}

/// Sort key of a product in the history listing: timestamp of its most
/// recent attempt, with the attempt's ledger position as tiebreaker.
fn latest_attempt_key(product: &Product) -> (DateTime<Utc>, usize) {
    product
        .return_attempts
        .iter()
        .enumerate()
        .map(|(idx, a)| (a.timestamp, idx))
        .max()
        .unwrap_or((DateTime::<Utc>::MIN_UTC, 0))
}
