use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use crate::config::Config;
use crate::db_storage::{DocumentStore, PostgresDocumentStore};
use crate::memory_storage::MemoryDocumentStore;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Creates a lazily-connecting pool. Connections are opened on first use,
    /// so an unreachable database does not prevent startup.
    pub fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }
}

/// Opens the document store described by `config`.
///
/// Returns `None` when storage is not configured or the pool cannot be
/// created; dependent endpoints then report a configuration error.
pub async fn connect_store(config: &Config) -> Option<Arc<dyn DocumentStore>> {
    let (Some(url), Some(name)) = (&config.database_url, &config.database_name) else {
        tracing::warn!("Storage not configured (DATABASE_URL and DATABASE_NAME are required)");
        return None;
    };

    if config.uses_memory_store() {
        tracing::info!("Using in-memory document store '{}'", name);
        return Some(Arc::new(MemoryDocumentStore::new()));
    }

    let db = match Database::new(url, config.db_max_connections) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to create database pool: {}", e);
            return None;
        }
    };

    let store = PostgresDocumentStore::new(db.pool, name.clone());
    match store.ping().await {
        Ok(()) => tracing::info!("Database connection pool established"),
        Err(e) => tracing::warn!("Database not reachable yet, continuing: {}", e),
    }

    Some(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_storage_is_none() {
        let config = Config::default();
        assert!(connect_store(&config).await.is_none());

        let only_url = Config {
            database_url: Some("memory://local".to_string()),
            ..Config::default()
        };
        assert!(connect_store(&only_url).await.is_none());
    }

    #[tokio::test]
    async fn memory_url_selects_memory_store() {
        let config = Config {
            database_url: Some("memory://local".to_string()),
            database_name: Some("leads".to_string()),
            ..Config::default()
        };
        let store = connect_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }
}
