//! In-memory product store for tests/dev.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use eshop_core::ProductId;
use eshop_products::{NewProduct, Page, PageRequest, Product};

use super::{ProductRepository, ProductStore, RepositoryError};

#[derive(Debug, Default)]
struct Shared {
    products: RwLock<BTreeMap<ProductId, Product>>,
    last_id: AtomicI64,
    fail_commits: AtomicBool,
}

/// In-memory product store.
///
/// Committed products live in a shared ordered map; every session stages its
/// writes privately until `commit`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    shared: Arc<Shared>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `products` (ids are kept as given).
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        {
            let mut map = store
                .shared
                .products
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for p in products {
                map.insert(p.id, p);
            }
            let max = map.keys().next_back().map(|id| id.get()).unwrap_or(0);
            store.shared.last_id.store(max, Ordering::SeqCst);
        }
        store
    }

    /// Make every subsequent commit fail (or succeed again). Test hook for the
    /// persistence-failure path.
    pub fn fail_commits(&self, fail: bool) {
        self.shared.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Read committed state directly, bypassing sessions.
    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.shared
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Number of committed products.
    pub fn len(&self) -> usize {
        self.shared
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn session(&self) -> Result<Box<dyn ProductRepository>, RepositoryError> {
        Ok(Box::new(InMemorySession {
            shared: self.shared.clone(),
            staged: Mutex::new(BTreeMap::new()),
        }))
    }
}

struct InMemorySession {
    shared: Arc<Shared>,
    staged: Mutex<BTreeMap<ProductId, Product>>,
}

impl InMemorySession {
    fn current(&self, id: ProductId) -> Option<Product> {
        let staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(p) = staged.get(&id) {
            return Some(p.clone());
        }
        self.shared
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn stage(&self, product: Product) {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product.id, product);
    }

    fn visible(&self, in_stock_only: bool) -> Vec<Product> {
        let mut merged = self
            .shared
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        merged.extend(staged.iter().map(|(id, p)| (*id, p.clone())));

        merged
            .into_values()
            .filter(|p| !in_stock_only || p.in_stock())
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemorySession {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.current(id))
    }

    async fn list(&self, in_stock_only: bool) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.visible(in_stock_only))
    }

    async fn page(
        &self,
        in_stock_only: bool,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        Ok(Page::from_ordered(self.visible(in_stock_only), request))
    }

    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let id = ProductId::new(self.shared.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let product = Product::from_new(id, new);
        self.stage(product.clone());
        Ok(product)
    }

    async fn apply_full_update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        if self.current(product.id).is_none() {
            return Ok(None);
        }
        self.stage(product.clone());
        Ok(Some(product))
    }

    async fn apply_quantity_delta(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<Option<Product>, RepositoryError> {
        let Some(mut product) = self.current(id) else {
            return Ok(None);
        };
        product.quantity = product
            .quantity
            .checked_add(delta)
            .ok_or_else(|| RepositoryError::Storage(format!("quantity overflow for product {id}")))?;
        self.stage(product.clone());
        Ok(Some(product))
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        if self.shared.fail_commits.load(Ordering::SeqCst) {
            return Err(RepositoryError::CommitFailed(
                "commits are disabled on this store".to_string(),
            ));
        }

        let staged = self.staged.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut products = self
            .shared
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        products.extend(staged);
        Ok(())
    }
}
