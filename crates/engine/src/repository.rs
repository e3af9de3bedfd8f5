//! Abstract repository contract the engine mutates state through.
//!
//! The engine takes no locks of its own: every concurrent-safety guarantee
//! rests on `save` being a compare-and-set conditioned on the product
//! version observed at load time.

use async_trait::async_trait;
use thiserror::Error;

use truetag_core::{DomainError, ProductId, UserId};
use truetag_token::IdentityToken;

use crate::product::{Product, ProductStatus};

/// Storage-level failure, kept distinguishable so the engine can map races
/// and uniqueness violations to the right domain outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique-constraint violation (`serial_number` or `identity_token`).
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Compare-and-set rejection: the stored version moved past the one the
    /// caller loaded. The caller must re-read before retrying.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// `save` on a product that was never inserted.
    #[error("unknown product")]
    UnknownProduct,

    /// Backend failure (connection loss, corruption, …).
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for DomainError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateKey(key) => DomainError::DuplicateKey(key),
            RepositoryError::VersionConflict { expected, actual } => DomainError::conflict(
                format!("expected version {expected}, found {actual}"),
            ),
            RepositoryError::UnknownProduct => DomainError::NotFound,
            RepositoryError::Storage(msg) => DomainError::conflict(msg),
        }
    }
}

/// Page request for admin listings.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

/// Durable keyed storage for product records.
///
/// Implementations must enforce:
/// - unique indexes on `serial_number` and `identity_token` at insert;
/// - `save` succeeding only when `expected_version` matches the stored
///   version, storing the product with `version = expected_version + 1`;
/// - reads returning an owned snapshot (no aliasing of stored state).
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a freshly registered product.
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn find_by_token(
        &self,
        token: &IdentityToken,
    ) -> Result<Option<Product>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_by_serial(&self, serial: &str) -> Result<Option<Product>, RepositoryError>;

    /// Compare-and-set write of a previously loaded product.
    async fn save(&self, product: &Product, expected_version: u64) -> Result<(), RepositoryError>;

    /// Products with at least one return attempt by `requester`.
    async fn find_with_attempts_by(
        &self,
        requester: UserId,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Admin listing, optionally filtered by status, newest-registered first.
    /// Returns the page plus the total match count.
    async fn list(
        &self,
        status: Option<ProductStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Product>, usize), RepositoryError>;
}
