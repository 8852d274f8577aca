// storage/mod.rs - Remote document store abstraction
//
// Documents are whole JSON files addressed by path. Every operation carries the
// caller's provider token; the store itself holds no credentials.

pub mod memory;
pub mod yandex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use memory::MemoryStore;
pub use yandex::YandexDiskClient;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage provider rejected the access token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Revision mismatch on {0}")]
    Conflict(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Raw document contents plus the content revision they were read at
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub revision: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>) -> Self {
        let revision = revision_of(&bytes);
        Self { bytes, revision }
    }
}

/// Write guard checked against the current content revision before upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Overwrite whatever is there
    Any,
    /// `None` means the document must not exist yet
    Revision(Option<String>),
}

impl Precondition {
    pub fn matches(&self, current: Option<&str>) -> bool {
        match self {
            Precondition::Any => true,
            Precondition::Revision(expected) => expected.as_deref() == current,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create every directory prefix of `path`. Best-effort, never fails.
    async fn ensure_container(&self, token: &str, path: &str);

    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn read(&self, token: &str, path: &str) -> Result<Option<Document>, StoreError>;

    /// Replace a document in full, returning its new revision
    async fn write(
        &self,
        token: &str,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<String, StoreError>;
}

/// Lowercase hex SHA-256 of the document bytes
pub fn revision_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Strict typed read. Missing documents yield `None`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    token: &str,
    path: &str,
) -> Result<Option<(T, String)>, StoreError> {
    match store.read(token, path).await? {
        Some(doc) => {
            let value = serde_json::from_slice(&doc.bytes)?;
            Ok(Some((value, doc.revision)))
        }
        None => Ok(None),
    }
}

/// Lenient typed read: any failure becomes `T::default()`
pub async fn read_json_or_default<T: DeserializeOwned + Default>(
    store: &dyn DocumentStore,
    token: &str,
    path: &str,
) -> T {
    match read_json::<T>(store, token, path).await {
        Ok(Some((value, _))) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("Reading {} failed, using empty document: {}", path, e);
            T::default()
        }
    }
}

pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    token: &str,
    path: &str,
    value: &T,
    precondition: Precondition,
) -> Result<String, StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    store.write(token, path, bytes, precondition).await
}

/// Join a storage root (e.g. `disk:/FamilyHub`) with a relative document path
pub fn join_path(root: &str, relative: &str) -> String {
    let root = root.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if root.is_empty() {
        format!("/{}", relative)
    } else {
        format!("{}/{}", root, relative)
    }
}

/// Every directory prefix of `path`, shortest first, skipping the scheme root.
/// `disk:/A/b/c.json` yields `disk:/A`, `disk:/A/b`.
pub fn parent_prefixes(path: &str) -> Vec<String> {
    let (scheme, rest) = match path.find(":/") {
        Some(idx) => path.split_at(idx + 2),
        None => ("/", path.trim_start_matches('/')),
    };

    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Vec::new();
    }

    let mut prefixes = Vec::with_capacity(segments.len() - 1);
    let mut current = scheme.to_string();
    for (i, segment) in segments[..segments.len() - 1].iter().enumerate() {
        if i > 0 {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }
    prefixes
}

/// Validate a single user-supplied path segment (member names)
pub fn validate_segment(segment: &str) -> Result<&str, StoreError> {
    let valid = !segment.is_empty()
        && segment.len() <= 64
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(segment)
    } else {
        Err(StoreError::InvalidPath(format!(
            "'{}' must be 1-64 characters of letters, digits, '-' or '_'",
            segment
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("disk:/FamilyHub", "family/family.json"), "disk:/FamilyHub/family/family.json");
        assert_eq!(join_path("disk:/FamilyHub/", "/projects/projects.json"), "disk:/FamilyHub/projects/projects.json");
        assert_eq!(join_path("", "family/family.json"), "/family/family.json");
    }

    #[test]
    fn test_parent_prefixes() {
        assert_eq!(
            parent_prefixes("disk:/FamilyHub/family/anna/calendar/events.json"),
            vec![
                "disk:/FamilyHub",
                "disk:/FamilyHub/family",
                "disk:/FamilyHub/family/anna",
                "disk:/FamilyHub/family/anna/calendar",
            ]
        );
        assert_eq!(parent_prefixes("/a/b.json"), vec!["/a"]);
        assert!(parent_prefixes("disk:/only.json").is_empty());
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("anna").is_ok());
        assert!(validate_segment("kid_2-b").is_ok());
        assert!(validate_segment("").is_err());
        assert!(validate_segment("..").is_err());
        assert!(validate_segment("a/b").is_err());
    }

    #[test]
    fn test_revision_is_stable_sha256() {
        assert_eq!(
            revision_of(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(revision_of(b"[]"), Document::new(b"[]".to_vec()).revision);
    }

    #[test]
    fn test_precondition_matching() {
        assert!(Precondition::Any.matches(None));
        assert!(Precondition::Revision(None).matches(None));
        assert!(!Precondition::Revision(None).matches(Some("abc")));
        assert!(Precondition::Revision(Some("abc".into())).matches(Some("abc")));
        assert!(!Precondition::Revision(Some("abc".into())).matches(None));
    }
}
