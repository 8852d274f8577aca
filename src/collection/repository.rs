use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::storage::{self, DocumentStore, Precondition, StoreError};

/// Read-modify-write cycles over whole JSON documents under a storage root
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
    root: String,
    max_attempts: u32,
}

impl CollectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>, root: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            store,
            root: root.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Absolute store path for a document relative to the root
    pub fn path(&self, relative: &str) -> String {
        storage::join_path(&self.root, relative)
    }

    /// Load a document for display. Read failures look like an empty document.
    pub async fn load<D>(&self, token: &str, relative: &str) -> D
    where
        D: DeserializeOwned + Default,
    {
        storage::read_json_or_default(self.store(), token, &self.path(relative)).await
    }

    /// Load a document, propagating read failures
    pub async fn load_strict<D>(&self, token: &str, relative: &str) -> Result<D, ApiError>
    where
        D: DeserializeOwned + Default,
    {
        let found = storage::read_json::<D>(self.store(), token, &self.path(relative)).await?;
        Ok(found.map(|(doc, _)| doc).unwrap_or_default())
    }

    /// Apply `mutate` to the current document and persist it.
    ///
    /// The write is conditional on the revision that was read. When another
    /// writer got there first the whole cycle is replayed against the fresh
    /// document, up to `max_attempts` times. An error from `mutate` aborts
    /// without writing anything.
    pub async fn update<D, R, F>(&self, token: &str, relative: &str, mut mutate: F) -> Result<R, ApiError>
    where
        D: DeserializeOwned + Serialize + Default + Send + Sync,
        R: Send,
        F: FnMut(&mut D) -> Result<R, ApiError> + Send,
    {
        let path = self.path(relative);
        let mut attempt = 1;

        loop {
            let (mut doc, revision) = match storage::read_json::<D>(self.store(), token, &path).await? {
                Some((doc, revision)) => (doc, Some(revision)),
                None => (D::default(), None),
            };

            let result = mutate(&mut doc)?;

            if revision.is_none() {
                self.store.ensure_container(token, &path).await;
            }

            match storage::write_json(self.store(), token, &path, &doc, Precondition::Revision(revision)).await {
                Ok(_) => return Ok(result),
                Err(StoreError::Conflict(_)) if attempt < self.max_attempts => {
                    debug!("Conflict writing {} (attempt {}), replaying", path, attempt);
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Overwrite a document unconditionally
    pub async fn replace<D>(&self, token: &str, relative: &str, doc: &D) -> Result<(), ApiError>
    where
        D: Serialize + Sync,
    {
        let path = self.path(relative);
        self.store.ensure_container(token, &path).await;
        storage::write_json(self.store(), token, &path, doc, Precondition::Any).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, MemoryStore};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    const PATH: &str = "family/anna/finances/transactions.json";
    const PATH_TOKEN: &str = "token";

    fn repo(store: Arc<dyn DocumentStore>) -> CollectionRepository {
        CollectionRepository::new(store, "disk:/Hub", 3)
    }

    #[tokio::test]
    async fn test_update_creates_missing_document() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo(store.clone());

        repo.update(PATH_TOKEN, PATH, |doc: &mut Vec<Value>| {
            doc.push(json!({"id": "1"}));
            Ok(())
        })
        .await
        .unwrap();

        let saved: Value = serde_json::from_slice(&store.get("disk:/Hub/family/anna/finances/transactions.json").unwrap()).unwrap();
        assert_eq!(saved, json!([{"id": "1"}]));
        assert!(store.has_container("disk:/Hub/family/anna/finances"));
    }

    #[tokio::test]
    async fn test_mutation_error_skips_write() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo(store.clone());

        let result: Result<(), ApiError> = repo
            .update(PATH_TOKEN, PATH, |_doc: &mut Vec<Value>| Err(ApiError::not_found("Transaction not found")))
            .await;

        assert_eq!(result.unwrap_err().status_code(), 404);
        assert_eq!(store.calls(), 1, "only the read should reach the store");
    }

    #[tokio::test]
    async fn test_unconditional_writes_lose_updates() {
        let store = Arc::new(MemoryStore::new());
        let path = repo(store.clone()).path(PATH);

        // Both writers read the same empty collection before either writes
        let mut first: Vec<Value> = storage::read_json_or_default(store.as_ref(), PATH_TOKEN, &path).await;
        let mut second: Vec<Value> = storage::read_json_or_default(store.as_ref(), PATH_TOKEN, &path).await;
        first.push(json!({"id": "a", "amount": 10}));
        second.push(json!({"id": "b", "amount": 20}));

        storage::write_json(store.as_ref(), PATH_TOKEN, &path, &first, Precondition::Any).await.unwrap();
        storage::write_json(store.as_ref(), PATH_TOKEN, &path, &second, Precondition::Any).await.unwrap();

        let saved: Vec<Value> = storage::read_json_or_default(store.as_ref(), PATH_TOKEN, &path).await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0]["id"], json!("b"));
    }

    /// Lets a competing writer land between our read and our first write
    struct RacingStore {
        inner: MemoryStore,
        raced: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn ensure_container(&self, token: &str, path: &str) {
            self.inner.ensure_container(token, path).await
        }

        async fn read(&self, token: &str, path: &str) -> Result<Option<Document>, StoreError> {
            self.inner.read(token, path).await
        }

        async fn write(&self, token: &str, path: &str, bytes: Vec<u8>, precondition: Precondition) -> Result<String, StoreError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                let competing = serde_json::to_vec(&json!([{"id": "other"}])).unwrap();
                self.inner.write(token, path, competing, Precondition::Any).await?;
            }
            self.inner.write(token, path, bytes, precondition).await
        }
    }

    #[tokio::test]
    async fn test_conflict_is_replayed_and_both_writes_survive() {
        let store = Arc::new(RacingStore { inner: MemoryStore::new(), raced: AtomicBool::new(false) });
        let repo = repo(store.clone());

        let mut runs = 0;
        repo.update(PATH_TOKEN, PATH, |doc: &mut Vec<Value>| {
            runs += 1;
            doc.push(json!({"id": "mine"}));
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(runs, 2);
        let saved: Vec<Value> = repo.load(PATH_TOKEN, PATH).await;
        let ids: Vec<&str> = saved.iter().filter_map(|v| v["id"].as_str()).collect();
        assert_eq!(ids, vec!["other", "mine"]);
    }

    #[tokio::test]
    async fn test_conflict_after_max_attempts_is_409() {
        struct AlwaysConflict;

        #[async_trait]
        impl DocumentStore for AlwaysConflict {
            async fn ensure_container(&self, _: &str, _: &str) {}
            async fn read(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
                Ok(Some(Document::new(b"[]".to_vec())))
            }
            async fn write(&self, _: &str, path: &str, _: Vec<u8>, _: Precondition) -> Result<String, StoreError> {
                Err(StoreError::Conflict(path.to_string()))
            }
        }

        let repo = repo(Arc::new(AlwaysConflict));
        let mut runs = 0;
        let err = repo
            .update(PATH_TOKEN, PATH, |_doc: &mut Vec<Value>| {
                runs += 1;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert_eq!(runs, 3);
    }

    #[tokio::test]
    async fn test_load_strict_propagates_parse_errors() {
        let store = Arc::new(MemoryStore::new());
        store.put("disk:/Hub/family/anna/finances/transactions.json", "not json");
        let repo = repo(store);

        let lenient: Vec<Value> = repo.load(PATH_TOKEN, PATH).await;
        assert!(lenient.is_empty());

        let strict = repo.load_strict::<Vec<Value>>(PATH_TOKEN, PATH).await;
        assert_eq!(strict.unwrap_err().status_code(), 500);
    }
}
