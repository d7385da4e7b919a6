//! In-process document store with optional JSON file persistence.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::store::document::{
    generate_key, Document, DocumentStore, StoreError, StoreResult, StoredDocument,
};

type Collection = BTreeMap<String, Document>;

/// A thread-safe document store.
///
/// Each collection sits behind its own dashmap shard lock. When a persistence
/// path is set, the whole store is rewritten to disk after every write.
/// Saves are serialized: the snapshot is taken while holding the save lock and
/// lands on disk through a temp file renamed over the target.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Collection>>,
    persistence_path: Option<PathBuf>,
    save_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading its contents if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self {
            collections: Arc::new(DashMap::new()),
            persistence_path: Some(path.to_path_buf()),
            save_lock: Arc::new(Mutex::new(())),
        };

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: HashMap<String, Collection> = serde_json::from_reader(reader)?;
            let mut total = 0;
            for (name, docs) in snapshot {
                total += docs.len();
                store.collections.insert(name, docs);
            }
            tracing::info!(path = %path.display(), documents = total, "Loaded document store");
        }

        Ok(store)
    }

    async fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let _guard = self.save_lock.lock().await;
        let snapshot: HashMap<String, Collection> = self
            .collections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let bytes = serde_json::to_vec(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn written(&self, collection: &str) -> StoreResult<()> {
        metrics::record_document_write(collection);
        self.save().await
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let key = generate_key();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.clone(), doc);
        self.written(collection).await?;
        Ok(key)
    }

    async fn set(&self, collection: &str, key: &str, doc: Document) -> StoreResult<()> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        self.written(collection).await
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key).cloned()))
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> StoreResult<()> {
        {
            let mut docs = self
                .collections
                .get_mut(collection)
                .ok_or_else(|| not_found(collection, key))?;
            let doc = docs.get_mut(key).ok_or_else(|| not_found(collection, key))?;
            for (field, value) in fields {
                doc.insert(field, value);
            }
        }
        self.written(collection).await
    }

    async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> StoreResult<Vec<StoredDocument>> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(key, doc)| StoredDocument {
                key: key.clone(),
                data: doc.clone(),
            })
            .collect())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<StoredDocument>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, doc)| StoredDocument {
                        key: key.clone(),
                        data: doc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> StoreResult<usize> {
        Ok(self.collections.get(collection).map(|d| d.len()).unwrap_or(0))
    }

    async fn flush(&self) -> StoreResult<()> {
        self.save().await
    }
}

fn not_found(collection: &str, key: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        key: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_and_count() {
        let store = MemoryStore::new();
        let key = store
            .insert("properties", doc(json!({"id": "ABC123", "title": "Loft"})))
            .await
            .unwrap();

        let fetched = store.get("properties", &key).await.unwrap().unwrap();
        assert_eq!(fetched["title"], "Loft");
        assert_eq!(store.count("properties").await.unwrap(), 1);
        assert_eq!(store.count("users").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_eq_is_exact_and_limited() {
        let store = MemoryStore::new();
        for status in ["FOR RENT", "FOR RENT", "SOLD"] {
            store
                .insert("properties", doc(json!({ "status": status })))
                .await
                .unwrap();
        }

        let rentals = store
            .find_eq("properties", "status", &json!("FOR RENT"), None)
            .await
            .unwrap();
        assert_eq!(rentals.len(), 2);

        let one = store
            .find_eq("properties", "status", &json!("FOR RENT"), Some(1))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);

        let none = store
            .find_eq("properties", "status", &json!("for rent"), None)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_existing() {
        let store = MemoryStore::new();
        let key = store
            .insert("maintenanceRequests", doc(json!({"status": "Pending", "issue": "Leak"})))
            .await
            .unwrap();

        store
            .update("maintenanceRequests", &key, doc(json!({"status": "Completed"})))
            .await
            .unwrap();
        let updated = store.get("maintenanceRequests", &key).await.unwrap().unwrap();
        assert_eq!(updated["status"], "Completed");
        assert_eq!(updated["issue"], "Leak");

        let err = store
            .update("maintenanceRequests", "missing", doc(json!({"status": "Completed"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::open(&path).unwrap();
        store
            .set("agreements", "482913", doc(json!({"status": "active"})))
            .await
            .unwrap();

        let reopened = MemoryStore::open(&path).unwrap();
        let record = reopened.get("agreements", "482913").await.unwrap().unwrap();
        assert_eq!(record["status"], "active");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_writes_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = MemoryStore::open(&path).unwrap();

        let mut handles = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert("maintenanceRequests", doc(json!({ "issue": format!("leak {i}") })))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.count("maintenanceRequests").await.unwrap(), 64);
        assert!(!temp_path(&path).exists());
    }
}
