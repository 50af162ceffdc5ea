use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::Document;

/// Document store seam shared by every storage-backed endpoint.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends `record` to `collection` and returns the identifier the store assigned.
    async fn create_document(
        &self,
        collection: &str,
        record: &serde_json::Value,
    ) -> Result<String, StorageError>;

    /// Returns up to `limit` documents from `collection`, newest first.
    async fn get_documents(
        &self,
        collection: &str,
        limit: i64,
    ) -> Result<Vec<Document>, StorageError>;

    /// Returns up to `limit` non-empty collection names, sorted.
    async fn list_collection_names(&self, limit: i64) -> Result<Vec<String>, StorageError>;

    /// Short backend label used in logs.
    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    body: serde_json::Value,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id.to_string(),
            body: row.body,
        }
    }
}

/// Postgres-backed document store.
///
/// All collections share one `documents` table inside the schema named by
/// `DATABASE_NAME`. The table is created on first use.
pub struct PostgresDocumentStore {
    pool: PgPool,
    schema: String,
    bootstrapped: OnceCell<()>,
}

impl PostgresDocumentStore {
    /// `schema` must already be a validated identifier (see `config::is_valid_store_name`).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
            bootstrapped: OnceCell::new(),
        }
    }

    fn table(&self) -> String {
        format!("\"{}\".documents", self.schema)
    }

    /// Creates the schema, table and index if missing. Runs once per process;
    /// a failed attempt is retried on the next call.
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.bootstrap()
            .await
            .map_err(|e| StorageError::Unavailable(format!("schema bootstrap failed: {}", e)))
    }

    async fn bootstrap(&self) -> Result<(), sqlx::Error> {
        self.bootstrapped
            .get_or_try_init(|| async {
                let table = self.table();
                let statements = [
                    format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", self.schema),
                    format!(
                        "CREATE TABLE IF NOT EXISTS {table} (
                            seq BIGSERIAL PRIMARY KEY,
                            id UUID NOT NULL UNIQUE DEFAULT gen_random_uuid(),
                            collection TEXT NOT NULL,
                            body JSONB NOT NULL,
                            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                        )"
                    ),
                    format!(
                        "CREATE INDEX IF NOT EXISTS documents_collection_seq_idx \
                         ON {table} (collection, seq DESC)"
                    ),
                ];

                for statement in &statements {
                    sqlx::query(statement).execute(&self.pool).await?;
                }

                tracing::info!("Document table ready: {}", table);
                Ok::<(), sqlx::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Whether the documents table exists. Read-only; never creates anything.
    async fn table_exists(&self) -> Result<bool, StorageError> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(self.table())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Round-trips a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        record: &serde_json::Value,
    ) -> Result<String, StorageError> {
        self.ensure_schema().await?;

        let id: Uuid = sqlx::query_scalar(&format!(
            "INSERT INTO {} (collection, body) VALUES ($1, $2) RETURNING id",
            self.table()
        ))
        .bind(collection)
        .bind(record)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted document {} into '{}'", id, collection);
        Ok(id.to_string())
    }

    async fn get_documents(
        &self,
        collection: &str,
        limit: i64,
    ) -> Result<Vec<Document>, StorageError> {
        self.ensure_schema().await?;

        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT id, body FROM {} \
             WHERE collection = $1 ORDER BY seq DESC LIMIT $2",
            self.table()
        ))
        .bind(collection)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Fetched {} documents from '{}'", rows.len(), collection);
        Ok(rows.into_iter().map(Document::from).collect())
    }

    /// Reports collections without bootstrapping: a missing table means none.
    async fn list_collection_names(&self, limit: i64) -> Result<Vec<String>, StorageError> {
        if !self.table_exists().await? {
            return Ok(Vec::new());
        }

        let names: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT collection FROM {} ORDER BY collection LIMIT $1",
            self.table()
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn table_name_is_schema_qualified() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let store = PostgresDocumentStore::new(pool, "marketing");
        assert_eq!(store.table(), "\"marketing\".documents");
        assert_eq!(store.backend_name(), "postgres");
    }

    #[test]
    fn row_converts_to_document_with_text_id() {
        let id = Uuid::new_v4();
        let document = Document::from(DocumentRow {
            id,
            body: serde_json::json!({"name": "Alice"}),
        });
        assert_eq!(document.id, id.to_string());
        assert_eq!(document.body["name"], "Alice");
    }

    #[tokio::test]
    async fn unreachable_database_reports_bootstrap_failure() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:1/unused")
            .unwrap();
        let store = PostgresDocumentStore::new(pool, "marketing");

        let err = store
            .create_document("lead", &serde_json::json!({"name": "Alice"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(err.to_string().starts_with("schema bootstrap failed"));
    }
}
