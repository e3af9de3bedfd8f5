//! Product record and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use truetag_core::{DomainError, DomainResult, LabelRegion, ProductId, ReturnAttemptId, TrustScore, UserId};
use truetag_token::IdentityToken;

/// Product status lifecycle: `Created → Activated → Returned`.
///
/// Monotonic. `Returned` is terminal; nothing transitions out of it, and
/// nothing reaches it except through an approved return on an `Activated`
/// product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Created,
    Activated,
    Returned,
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductStatus::Created => write!(f, "created"),
            ProductStatus::Activated => write!(f, "activated"),
            ProductStatus::Returned => write!(f, "returned"),
        }
    }
}

/// One arbitrated return request. Immutable once appended — the attempt list
/// is a ledger, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnAttempt {
    pub id: ReturnAttemptId,
    pub requester_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub trust_score: TrustScore,
    pub approved: bool,
    pub reason: String,
    /// True when `trust_score` is the oracle-unavailable fallback rather
    /// than a genuine verdict.
    pub degraded: bool,
}

/// A registered physical product.
///
/// # Invariants
/// - `serial_number` and `identity_token` are globally unique (repository
///   enforced) and immutable after registration.
/// - `status == Activated ⇒ activated_by and activated_at are set`.
/// - `status == Returned ⇒ return_attempts is non-empty and its last entry
///   has `approved == true``.
/// - `return_attempts` only grows; entries are never edited or reordered.
/// - `version` increments on every successful save; it is the repository's
///   compare-and-set token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub serial_number: String,
    pub name: String,
    pub brand: String,
    pub identity_token: IdentityToken,
    pub status: ProductStatus,
    pub activated_by: Option<UserId>,
    pub activated_at: Option<DateTime<Utc>>,
    pub label_region: LabelRegion,
    pub return_attempts: Vec<ReturnAttempt>,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl Product {
    /// Build a freshly registered product in the `Created` state.
    pub fn register(
        serial_number: String,
        name: String,
        brand: String,
        identity_token: IdentityToken,
        label_region: LabelRegion,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if serial_number.trim().is_empty() {
            return Err(DomainError::validation("serial number must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if brand.trim().is_empty() {
            return Err(DomainError::validation("brand must not be empty"));
        }

        Ok(Self {
            id: ProductId::new(),
            serial_number,
            name,
            brand,
            identity_token,
            status: ProductStatus::Created,
            activated_by: None,
            activated_at: None,
            label_region,
            return_attempts: Vec::new(),
            created_at: now,
            version: 0,
        })
    }

    /// `Created → Activated`, at most once.
    ///
    /// The in-memory check is necessary but not sufficient: the winner of a
    /// concurrent race is decided by the repository's compare-and-set save,
    /// not here.
    pub fn activate(&mut self, requester_id: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != ProductStatus::Created {
            return Err(DomainError::AlreadyActivated);
        }
        self.status = ProductStatus::Activated;
        self.activated_by = Some(requester_id);
        self.activated_at = Some(now);
        Ok(())
    }

    /// True iff `requester_id` is the activating owner.
    pub fn is_owned_by(&self, requester_id: UserId) -> bool {
        self.activated_by == Some(requester_id)
    }

    /// Append an arbitrated attempt to the ledger and, iff it was approved,
    /// take the terminal `Activated → Returned` transition.
    ///
    /// Rejects products outside `Activated`: a returned product is never
    /// re-arbitrated, and a `Created` one has no owner to return it.
    pub fn record_return_attempt(&mut self, attempt: ReturnAttempt) -> DomainResult<()> {
        if self.status != ProductStatus::Activated {
            return Err(DomainError::NotReturnable);
        }
        let approved = attempt.approved;
        self.return_attempts.push(attempt);
        if approved {
            self.status = ProductStatus::Returned;
        }
        Ok(())
    }

    /// Read-only projection exposed to activation/status callers.
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            serial_number: self.serial_number.clone(),
            status: self.status,
            activated_by: self.activated_by,
            activated_at: self.activated_at,
        }
    }
}

/// Slim projection of a product for status reads and activation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub serial_number: String,
    pub status: ProductStatus,
    pub activated_by: Option<UserId>,
    pub activated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> LabelRegion {
        LabelRegion::new(0.0, 0.0, 100.0, 50.0).unwrap()
    }

    fn product() -> Product {
        Product::register(
            "SN-001".to_string(),
            "Sneaker".to_string(),
            "Acme".to_string(),
            IdentityToken::from("aa".repeat(32).as_str()),
            region(),
            Utc::now(),
        )
        .unwrap()
    }

    fn attempt(requester: UserId, score: f64, approved: bool) -> ReturnAttempt {
        ReturnAttempt {
            id: truetag_core::ReturnAttemptId::new(),
            requester_id: requester,
            timestamp: Utc::now(),
            trust_score: TrustScore::new(score).unwrap(),
            approved,
            reason: "damaged".to_string(),
            degraded: false,
        }
    }

    #[test]
    fn register_rejects_blank_fields() {
        let err = Product::register(
            "  ".to_string(),
            "Sneaker".to_string(),
            "Acme".to_string(),
            IdentityToken::from("ab"),
            region(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn fresh_product_is_created_and_unowned() {
        let p = product();
        assert_eq!(p.status, ProductStatus::Created);
        assert!(p.activated_by.is_none());
        assert!(p.activated_at.is_none());
        assert_eq!(p.version, 0);
    }

    #[test]
    fn activation_sets_owner_and_timestamp_atomically() {
        let mut p = product();
        let owner = UserId::new();
        p.activate(owner, Utc::now()).unwrap();
        assert_eq!(p.status, ProductStatus::Activated);
        assert_eq!(p.activated_by, Some(owner));
        assert!(p.activated_at.is_some());
    }

    #[test]
    fn second_activation_is_rejected() {
        let mut p = product();
        p.activate(UserId::new(), Utc::now()).unwrap();
        let err = p.activate(UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::AlreadyActivated);
    }

    #[test]
    fn denied_attempt_keeps_status_and_grows_ledger() {
        let mut p = product();
        let owner = UserId::new();
        p.activate(owner, Utc::now()).unwrap();

        p.record_return_attempt(attempt(owner, 0.3, false)).unwrap();
        assert_eq!(p.status, ProductStatus::Activated);
        assert_eq!(p.return_attempts.len(), 1);

        p.record_return_attempt(attempt(owner, 0.9, true)).unwrap();
        assert_eq!(p.status, ProductStatus::Returned);
        assert_eq!(p.return_attempts.len(), 2);
        assert!(p.return_attempts.last().unwrap().approved);
    }

    #[test]
    fn returned_product_rejects_further_attempts() {
        let mut p = product();
        let owner = UserId::new();
        p.activate(owner, Utc::now()).unwrap();
        p.record_return_attempt(attempt(owner, 0.9, true)).unwrap();

        let err = p
            .record_return_attempt(attempt(owner, 0.9, true))
            .unwrap_err();
        assert_eq!(err, DomainError::NotReturnable);
        assert_eq!(p.status, ProductStatus::Returned);
        assert_eq!(p.return_attempts.len(), 1);
    }

    #[test]
    fn created_product_cannot_record_attempts() {
        let mut p = product();
        let err = p
            .record_return_attempt(attempt(UserId::new(), 0.9, true))
            .unwrap_err();
        assert_eq!(err, DomainError::NotReturnable);
    }
}
