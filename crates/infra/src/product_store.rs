//! In-memory product repository.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use truetag_core::{ProductId, UserId};
use truetag_engine::{
    Product, ProductStatus,
    repository::{PageRequest, ProductRepository, RepositoryError},
};
use truetag_token::IdentityToken;

/// In-memory keyed store with unique secondary indexes and version-checked
/// compare-and-set saves.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<Store>,
}

#[derive(Debug, Default)]
struct Store {
    products: HashMap<ProductId, Product>,
    by_serial: HashMap<String, ProductId>,
    by_token: HashMap<IdentityToken, ProductId>,
    /// Registration order, for newest-first listings.
    insertion_order: Vec<ProductId>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().map_err(|_| poisoned())?;

        if store.by_serial.contains_key(&product.serial_number) {
            return Err(RepositoryError::DuplicateKey(format!(
                "serial_number {}",
                product.serial_number
            )));
        }
        if store.by_token.contains_key(&product.identity_token) {
            return Err(RepositoryError::DuplicateKey("identity_token".to_string()));
        }
        if store.products.contains_key(&product.id) {
            return Err(RepositoryError::DuplicateKey(format!("id {}", product.id)));
        }

        store
            .by_serial
            .insert(product.serial_number.clone(), product.id);
        store
            .by_token
            .insert(product.identity_token.clone(), product.id);
        store.insertion_order.push(product.id);
        store.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &IdentityToken,
    ) -> Result<Option<Product>, RepositoryError> {
        let store = self.inner.read().map_err(|_| poisoned())?;
        Ok(store
            .by_token
            .get(token)
            .and_then(|id| store.products.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let store = self.inner.read().map_err(|_| poisoned())?;
        Ok(store.products.get(&id).cloned())
    }

    async fn find_by_serial(&self, serial: &str) -> Result<Option<Product>, RepositoryError> {
        let store = self.inner.read().map_err(|_| poisoned())?;
        Ok(store
            .by_serial
            .get(serial)
            .and_then(|id| store.products.get(id))
            .cloned())
    }

    async fn save(&self, product: &Product, expected_version: u64) -> Result<(), RepositoryError> {
        let mut store = self.inner.write().map_err(|_| poisoned())?;

        let stored = store
            .products
            .get_mut(&product.id)
            .ok_or(RepositoryError::UnknownProduct)?;

        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                expected: expected_version,
                actual: stored.version,
            });
        }

        let mut updated = product.clone();
        updated.version = expected_version + 1;
        *stored = updated;
        Ok(())
    }

    async fn find_with_attempts_by(
        &self,
        requester: UserId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let store = self.inner.read().map_err(|_| poisoned())?;
        Ok(store
            .insertion_order
            .iter()
            .filter_map(|id| store.products.get(id))
            .filter(|p| p.return_attempts.iter().any(|a| a.requester_id == requester))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        status: Option<ProductStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Product>, usize), RepositoryError> {
        let store = self.inner.read().map_err(|_| poisoned())?;

        // Newest registration first.
        let matching: Vec<&Product> = store
            .insertion_order
            .iter()
            .rev()
            .filter_map(|id| store.products.get(id))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .collect();

        let total = matching.len();
        let products = matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();

        Ok((products, total))
    }
}
