//! Infrastructure wiring: product store and update queue.

use std::sync::Arc;

use anyhow::Context;

use eshop_infra::Config;
use eshop_infra::jobs::ProductUpdateQueue;
use eshop_infra::repository::{
    InMemoryProductStore, PostgresProductStore, ProductStore, seed_if_empty,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn ProductStore>,
    pub updates: ProductUpdateQueue,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            updates: ProductUpdateQueue::new(),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(store: InMemoryProductStore) -> Self {
        Self::new(Arc::new(store))
    }
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let store: Arc<dyn ProductStore> = if config.use_persistent_stores {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;
        let store = PostgresProductStore::connect(url)
            .await
            .context("failed to connect to Postgres")?;
        store.migrate().await.context("failed to create the products table")?;
        tracing::info!("using Postgres product store");
        Arc::new(store)
    } else {
        tracing::info!("using in-memory product store");
        Arc::new(InMemoryProductStore::new())
    };

    if config.seed_demo_data {
        seed_if_empty(store.as_ref())
            .await
            .context("failed to seed the demo catalog")?;
    }

    Ok(AppServices::new(store))
}
