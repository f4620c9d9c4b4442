//! Shared application state for all routes.

use crate::catalog::Catalog;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Built once at startup; immutable until restart.
    pub catalog: Arc<Catalog>,
    /// Lazy one-time caches; OnceCell keeps the first concurrent builds idempotent.
    pub metadata: Arc<OnceCell<Value>>,
    pub permissions: Arc<OnceCell<Vec<Value>>>,
}

impl AppState {
    pub fn new(pool: PgPool, catalog: Catalog) -> Self {
        AppState {
            pool,
            catalog: Arc::new(catalog),
            metadata: Arc::new(OnceCell::new()),
            permissions: Arc::new(OnceCell::new()),
        }
    }
}
