//! Registration, activation, and status reads.

use std::sync::Arc;

use chrono::Utc;

use truetag_core::{DomainError, DomainResult, LabelRegion, ProductId, UserId};
use truetag_token::{IdentityToken, TokenService};

use crate::product::{Product, ProductStatus, ProductSummary};
use crate::repository::{PageRequest, ProductRepository, RepositoryError};

/// Registration input (privileged operation; authorization happens at the
/// API boundary).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub serial_number: String,
    pub name: String,
    pub brand: String,
    pub label_region: LabelRegion,
}

/// One page of an admin product listing.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// State machine driver for `created → activated` plus the read paths that
/// don't involve arbitration.
pub struct ProductLifecycle {
    repository: Arc<dyn ProductRepository>,
    tokens: TokenService,
}

impl ProductLifecycle {
    pub fn new(repository: Arc<dyn ProductRepository>, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }

    /// Register a new product, minting its identity token.
    pub async fn register(&self, input: NewProduct) -> DomainResult<Product> {
        let identity_token = self.tokens.generate_identity_token();
        let product = Product::register(
            input.serial_number,
            input.name,
            input.brand,
            identity_token,
            input.label_region,
            Utc::now(),
        )?;

        self.repository.insert(&product).await?;

        tracing::info!(
            product_id = %product.id,
            serial_number = %product.serial_number,
            "product registered"
        );
        Ok(product)
    }

    /// `created → activated`, exactly one winner under concurrency.
    ///
    /// The save is conditioned on the version observed at load; a concurrent
    /// activator bumps it first and this caller's compare-and-set fails. The
    /// loser is told `AlreadyActivated` — it cannot (and need not) tell a
    /// lost race from an earlier activation.
    pub async fn activate(
        &self,
        token: &IdentityToken,
        requester_id: UserId,
    ) -> DomainResult<ProductSummary> {
        let mut product = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::NotFound)?;

        let loaded_version = product.version;
        product.activate(requester_id, Utc::now())?;

        match self.repository.save(&product, loaded_version).await {
            Ok(()) => {
                tracing::info!(
                    product_id = %product.id,
                    requester_id = %requester_id,
                    "product activated"
                );
                Ok(product.summary())
            }
            Err(RepositoryError::VersionConflict { .. }) => Err(DomainError::AlreadyActivated),
            Err(e) => Err(e.into()),
        }
    }

    /// Read-only status projection. Safe to call unauthenticated and
    /// repeatedly; never mutates.
    pub async fn get_status(&self, token: &IdentityToken) -> DomainResult<ProductSummary> {
        let product = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(product.summary())
    }

    /// Admin read of a full product record, ledger included.
    pub async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    /// Admin listing, newest-registered first. `page` is 1-based.
    pub async fn list_products(
        &self,
        status: Option<ProductStatus>,
        page: usize,
        limit: usize,
    ) -> DomainResult<ProductPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let (products, total) = self
            .repository
            .list(
                status,
                PageRequest {
                    offset: (page - 1) * limit,
                    limit,
                },
            )
            .await?;

        Ok(ProductPage {
            products,
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
        })
    }
}
