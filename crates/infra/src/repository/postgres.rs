//! Postgres-backed product store.
//!
//! Every session owns one database transaction. Reads and writes inside the
//! session go through that transaction, so pending writes are visible to the
//! session itself and to nobody else until `commit`. Dropping a session rolls
//! its transaction back.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | PoolTimedOut / PoolClosed | `Unavailable` |
//! | failure on `COMMIT` | `CommitFailed` |
//! | anything else | `Storage` |

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use eshop_core::ProductId;
use eshop_products::{NewProduct, Page, PageRequest, Product};

use super::{ProductRepository, ProductStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, name, main_image_url, price, description, quantity";

/// Postgres-backed product store.
///
/// Uses the SQLx connection pool, which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and build a store on top of the new pool.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id             BIGSERIAL PRIMARY KEY,
                name           TEXT   NOT NULL,
                main_image_url TEXT   NOT NULL,
                price          BIGINT NOT NULL DEFAULT 0,
                description    TEXT   NOT NULL DEFAULT '',
                quantity       BIGINT NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&*self.pool)
        .await?;
        debug!("products table ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    async fn session(&self) -> Result<Box<dyn ProductRepository>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresSession { tx: Mutex::new(tx) }))
    }
}

struct PostgresSession {
    tx: Mutex<Transaction<'static, Postgres>>,
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        main_image_url: row.try_get("main_image_url")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
    })
}

fn stock_filter(in_stock_only: bool) -> &'static str {
    if in_stock_only { "WHERE quantity > 0" } else { "" }
}

#[async_trait::async_trait]
impl ProductRepository for PostgresSession {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn list(&self, in_stock_only: bool) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {} ORDER BY id",
            stock_filter(in_stock_only)
        ))
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.iter().map(product_from_row).collect::<Result<_, _>>()?)
    }

    async fn page(
        &self,
        in_stock_only: bool,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let total: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) AS total FROM products {}",
            stock_filter(in_stock_only)
        ))
        .fetch_one(&mut **tx)
        .await?
        .try_get("total")?;

        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {} ORDER BY id LIMIT $1 OFFSET $2",
            stock_filter(in_stock_only)
        ))
        .bind(request.page_size)
        .bind(request.offset())
        .fetch_all(&mut **tx)
        .await?;

        let items: Vec<Product> = rows.iter().map(product_from_row).collect::<Result<_, _>>()?;
        Ok(Page::new(items, request, total))
    }

    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(&format!(
            "INSERT INTO products (name, main_image_url, price, description, quantity) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.main_image_url)
        .bind(new.price)
        .bind(&new.description)
        .bind(new.quantity)
        .fetch_one(&mut **tx)
        .await?;
        Ok(product_from_row(&row)?)
    }

    async fn apply_full_update(&self, product: Product) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(&format!(
            "UPDATE products SET name = $2, main_image_url = $3, price = $4, description = $5, \
             quantity = $6 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.id.get())
        .bind(&product.name)
        .bind(&product.main_image_url)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.quantity)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn apply_quantity_delta(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(&format!(
            "UPDATE products SET quantity = quantity + $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.get())
        .bind(delta)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx
            .into_inner()
            .commit()
            .await
            .map_err(|e| RepositoryError::CommitFailed(e.to_string()))
    }
}
