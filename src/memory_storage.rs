use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db_storage::DocumentStore;
use crate::errors::StorageError;
use crate::models::Document;

/// Process-local document store, selected with `DATABASE_URL=memory://...`.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        collection: &str,
        record: &serde_json::Value,
    ) -> Result<String, StorageError> {
        let id = Uuid::new_v4().simple().to_string();
        let document = Document {
            id: id.clone(),
            body: record.clone(),
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);

        tracing::debug!("Inserted document {} into '{}' (memory)", id, collection);
        Ok(id)
    }

    async fn get_documents(
        &self,
        collection: &str,
        limit: i64,
    ) -> Result<Vec<Document>, StorageError> {
        let take = usize::try_from(limit).unwrap_or(0);
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().rev().take(take).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_collection_names(&self, limit: i64) -> Result<Vec<String>, StorageError> {
        let take = usize::try_from(limit).unwrap_or(0);
        let collections = self.collections.read().await;

        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names.truncate(take);
        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_newest_first_up_to_limit() {
        let store = MemoryDocumentStore::new();
        for n in 0..5 {
            store
                .create_document("lead", &json!({ "n": n }))
                .await
                .unwrap();
        }

        let docs = store.get_documents("lead", 3).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d.body["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![4, 3, 2]);
        assert_eq!(store.count("lead").await, 5);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = MemoryDocumentStore::new();
        let a = store.create_document("lead", &json!({})).await.unwrap();
        let b = store.create_document("lead", &json!({})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_documents("lead", 10).await.unwrap().is_empty());
        assert!(store.list_collection_names(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_sorted_collection_names() {
        let store = MemoryDocumentStore::new();
        for name in ["newsletter", "lead", "quote"] {
            store.create_document(name, &json!({})).await.unwrap();
        }
        assert_eq!(
            store.list_collection_names(2).await.unwrap(),
            vec!["lead".to_string(), "newsletter".to_string()]
        );
    }
}
