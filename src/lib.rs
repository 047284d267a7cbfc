//! Taskdesk server - internal work request tracking and evaluation

pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod store;

use sqlx::SqlitePool;
use std::sync::Arc;

use lifecycle::LifecycleEngine;
use store::Store;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub lifecycle: LifecycleEngine,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        let store = Store::new(pool);
        Arc::new(Self {
            lifecycle: LifecycleEngine::new(store.clone()),
            store,
        })
    }
}
