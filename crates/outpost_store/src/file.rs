//! JSON-file store backend.

use crate::error::{StoreError, StoreResult};
use crate::store::LocalStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A document store persisted as one JSON file per collection.
///
/// Each collection lives at `<root>/<collection>.json` as a JSON object
/// mapping document ids to documents. Writes go through a
/// write-to-temp-then-rename cycle so a crash mid-write leaves the previous
/// file intact.
///
/// Collection names are expected to be path-safe identifiers
/// (`vehicles`, `_mutation_queue`); they are used verbatim as file stems.
///
/// This backend favors simplicity over throughput: every mutation rewrites
/// the whole collection file. That is the right trade for a client-side
/// cache holding at most a few thousand documents per collection.
pub struct JsonFileStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles across tasks.
    write_gate: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_gate: Mutex::new(()),
        })
    }

    /// Returns the root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    async fn load(&self, collection: &str) -> StoreResult<BTreeMap<String, Value>> {
        let path = self.collection_path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };

        let value: Value = serde_json::from_slice(&bytes)?;
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(StoreError::corrupt(
                path.display().to_string(),
                "expected a top-level JSON object",
            )),
        }
    }

    async fn persist(&self, collection: &str, docs: &BTreeMap<String, Value>) -> StoreResult<()> {
        let path = self.collection_path(collection);
        let tmp = self.root.join(format!("{collection}.json.tmp"));
        let bytes = serde_json::to_vec_pretty(docs)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self.load(collection).await?.into_values().collect())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        Ok(self.load(collection).await?.remove(id))
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;
        let mut docs = self.load(collection).await?;
        docs.insert(id.to_string(), document);
        self.persist(collection, &docs).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let _gate = self.write_gate.lock().await;
        let mut docs = self.load(collection).await?;
        let existed = docs.remove(id).is_some();
        if existed {
            self.persist(collection, &docs).await?;
        }
        Ok(existed)
    }

    async fn replace_all(
        &self,
        collection: &str,
        documents: Vec<(String, Value)>,
    ) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;
        let docs: BTreeMap<String, Value> = documents.into_iter().collect();
        self.persist(collection, &docs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn file_missing_collection_reads_empty() {
        let (_dir, store) = temp_store().await;
        assert!(store.get_all("vehicles").await.unwrap().is_empty());
        assert!(store.get_by_id("vehicles", "v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_put_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            store
                .put("vehicles", "v1", json!({"id": "v1", "plate": "XY-99"}))
                .await
                .unwrap();
        }

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let doc = store.get_by_id("vehicles", "v1").await.unwrap().unwrap();
        assert_eq!(doc["plate"], "XY-99");
    }

    #[tokio::test]
    async fn file_delete_removes_document() {
        let (_dir, store) = temp_store().await;
        store.put("vehicles", "v1", json!({})).await.unwrap();

        assert!(store.delete("vehicles", "v1").await.unwrap());
        assert!(!store.delete("vehicles", "v1").await.unwrap());
        assert!(store.get_by_id("vehicles", "v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_replace_all_drops_stale_documents() {
        let (_dir, store) = temp_store().await;
        store.put("vehicles", "stale", json!({})).await.unwrap();

        store
            .replace_all("vehicles", vec![("v1".into(), json!({"id": "v1"}))])
            .await
            .unwrap();

        assert!(store.get_by_id("vehicles", "stale").await.unwrap().is_none());
        assert_eq!(store.get_all("vehicles").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn file_get_all_sorted_by_key() {
        let (_dir, store) = temp_store().await;
        store.put("q", "0002", json!({"n": 2})).await.unwrap();
        store.put("q", "0001", json!({"n": 1})).await.unwrap();

        let docs = store.get_all("q").await.unwrap();
        let order: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[tokio::test]
    async fn file_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("vehicles.json"), b"[1, 2, 3]")
            .await
            .unwrap();

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let err = store.get_all("vehicles").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
