use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{parent_prefixes, revision_of, Document, DocumentStore, Precondition, StoreError};

/// Process-local document store. Used for `STORAGE_BACKEND=memory` and tests.
///
/// The precondition check and the write happen under one lock, so concurrent
/// writers always observe each other's revisions.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Vec<u8>>>,
    containers: Mutex<BTreeSet<String>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seed or overwrite a document directly, bypassing call counting
    pub fn put(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.lock_documents().insert(path.to_string(), bytes.into());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.lock_documents().get(path).cloned()
    }

    pub fn has_container(&self, path: &str) -> bool {
        self.containers
            .lock()
            .map(|c| c.contains(path))
            .unwrap_or(false)
    }

    fn lock_documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A panic while holding the lock cannot leave a half-written document
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_container(&self, _token: &str, path: &str) {
        self.count();
        if let Ok(mut containers) = self.containers.lock() {
            containers.extend(parent_prefixes(path));
        }
    }

    async fn read(&self, _token: &str, path: &str) -> Result<Option<Document>, StoreError> {
        self.count();
        Ok(self.lock_documents().get(path).cloned().map(Document::new))
    }

    async fn write(
        &self,
        _token: &str,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<String, StoreError> {
        self.count();
        let mut documents = self.lock_documents();

        let current = documents.get(path).map(|b| revision_of(b));
        if !precondition.matches(current.as_deref()) {
            return Err(StoreError::Conflict(path.to_string()));
        }

        let revision = revision_of(&bytes);
        documents.insert(path.to_string(), bytes);
        Ok(revision)
    }
}
