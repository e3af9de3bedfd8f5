//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (lifecycle
/// violations, ownership, uniqueness, concurrency). Infrastructure concerns
/// belong elsewhere; oracle unavailability is absorbed by the engine and never
/// appears here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No product resolves to the presented token or id.
    #[error("not found")]
    NotFound,

    /// Activation was attempted on a product that already left `created`.
    ///
    /// Benign idempotent-failure: retried client requests and lost activation
    /// races both land here, and callers need not tell them apart.
    #[error("product already activated")]
    AlreadyActivated,

    /// The requester does not own the product (or it was never activated).
    #[error("not the owner of this product")]
    NotOwner,

    /// A return was requested on a product whose status is not `activated`.
    ///
    /// In particular, a product that already reached the terminal `returned`
    /// state is never re-arbitrated.
    #[error("product is not in a returnable state")]
    NotReturnable,

    /// Unique-constraint violation on `serial_number` or `identity_token`.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Repository compare-and-set rejection that survived the retry budget.
    ///
    /// The caller should retry the whole operation, not resume partial state.
    #[error("concurrent modification: {0}")]
    ConcurrencyConflict(String),

    /// Missing secret/key at startup. Fatal at boot, never at request time.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_key(msg: impl Into<String>) -> Self {
        Self::DuplicateKey(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
