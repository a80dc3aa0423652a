//! Product storage behind a unit-of-work style capability.
//!
//! A [`ProductStore`] hands out sessions; a session ([`ProductRepository`]) reads
//! through to committed state plus its own pending writes, and publishes those
//! writes only on [`ProductRepository::commit`]. Dropping a session without
//! committing discards everything it wrote.

use std::sync::Arc;

use eshop_core::ProductId;
use eshop_products::{NewProduct, Page, PageRequest, Product};

pub mod in_memory;
pub mod postgres;
pub mod seed;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use seed::{demo_catalog, seed_if_empty};

/// Storage-level error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("commit failed: {0}")]
    CommitFailed(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Unavailable(value.to_string())
            }
            other => Self::Storage(other.to_string()),
        }
    }
}

/// One unit of work against the product catalog.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    /// Get a single product by identifier (pending writes of this session included).
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// All products ordered by id, optionally only those in stock.
    async fn list(&self, in_stock_only: bool) -> Result<Vec<Product>, RepositoryError>;

    /// One page of products ordered by id, optionally only those in stock.
    async fn page(
        &self,
        in_stock_only: bool,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError>;

    /// Add a new product; the store assigns its identifier.
    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError>;

    /// Replace every field of an existing product.
    ///
    /// Returns `None` if the product no longer exists.
    async fn apply_full_update(&self, product: Product) -> Result<Option<Product>, RepositoryError>;

    /// Add `delta` to the quantity of an existing product.
    ///
    /// Returns `None` if the product no longer exists. No stock rule is enforced
    /// here; callers validate first.
    async fn apply_quantity_delta(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Persist pending writes. Consumes the session so it cannot be used afterwards.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// A factory for product sessions.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn session(&self) -> Result<Box<dyn ProductRepository>, RepositoryError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn session(&self) -> Result<Box<dyn ProductRepository>, RepositoryError> {
        (**self).session().await
    }
}
