//! Adapter implementations for the task store port.

pub mod memory;
pub mod postgres;

use crate::config::StoreConfig;
use crate::task::ports::{TaskStore, TaskStoreError, TaskStoreResult};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;

/// Builds the store variant selected by configuration.
///
/// Called once at start-up; everything downstream works against the
/// returned trait object.
///
/// # Errors
///
/// Returns [`TaskStoreError::Persistence`] when the `PostgreSQL` connection
/// pool cannot be established.
pub fn store_from_config(config: &StoreConfig) -> TaskStoreResult<Arc<dyn TaskStore>> {
    match config {
        StoreConfig::Memory => {
            tracing::info!(store = "memory", "using in-memory task store");
            Ok(Arc::new(memory::InMemoryTaskStore::new()))
        }
        StoreConfig::Postgres {
            database_url,
            pool_size,
        } => {
            let manager = ConnectionManager::<PgConnection>::new(database_url.as_str());
            let pool: postgres::TaskPgPool = Pool::builder()
                .max_size(pool_size.get())
                .build(manager)
                .map_err(TaskStoreError::persistence)?;
            tracing::info!(
                store = "postgres",
                pool_size = pool_size.get(),
                "using PostgreSQL task store"
            );
            Ok(Arc::new(postgres::PostgresTaskStore::new(pool)))
        }
    }
}
