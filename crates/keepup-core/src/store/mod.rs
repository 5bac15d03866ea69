//! Document store abstraction.
//!
//! Documents are JSON objects addressed by slash-separated paths
//! (`reviews/<id>`, `reviews/<id>/votes/<uid>`). A document's collection is
//! its path without the last segment, so sub-collections are separate
//! collections. Every stored document carries a version; `commit` applies a
//! batch of writes only if none of the listed versions moved.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, StoredDocument, VersionedSnapshot};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tokio::sync::broadcast;

/// Version reported for a document that does not exist
pub const ABSENT_VERSION: u64 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document changed concurrently: {0}")]
    Conflict(String),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().trim_matches('/').to_string())
    }

    /// Join segments with '/'
    pub fn from_segments(segments: &[&str]) -> Self {
        Self::new(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the collection holding this document ("" for a top-level path)
    pub fn collection(&self) -> &str {
        self.0.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
    }

    /// Last path segment
    pub fn id(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, id)| id).unwrap_or(&self.0)
    }

    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment))
    }

    /// True for this path and everything nested below it
    pub fn is_within(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_matches('/');
        self.0 == prefix || self.0.strip_prefix(prefix).map_or(false, |rest| rest.starts_with('/'))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document read together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    pub version: u64,
    pub data: Option<Value>,
}

impl Versioned {
    pub fn absent() -> Self {
        Self { version: ABSENT_VERSION, data: None }
    }
}

/// Commit guard: the document at `path` must still be at `version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precondition {
    pub path: DocPath,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set(DocPath, Value),
    Delete(DocPath),
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            WriteOp::Set(path, _) | WriteOp::Delete(path) => path,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    async fn get_versioned(&self, path: &DocPath) -> Result<Versioned, StoreError>;

    /// Create or replace the whole document
    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError>;

    /// Deleting a missing document is not an error
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;

    /// Documents of `collection` whose top-level `field` equals `value`
    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<(DocPath, Value)>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<(DocPath, Value)>, StoreError>;

    /// Apply `writes` atomically, or fail with `Conflict` if any precondition no longer holds
    async fn commit(&self, preconditions: &[Precondition], writes: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Paths of documents written after the call, in commit order
    fn changes(&self) -> broadcast::Receiver<DocPath>;

    async fn flush(&self) -> Result<(), StoreError>;
}

pub async fn get_typed<T: DeserializeOwned>(store: &dyn DocumentStore, path: &DocPath) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn set_typed<T: Serialize>(store: &dyn DocumentStore, path: &DocPath, value: &T) -> Result<(), StoreError> {
    store.set(path, serde_json::to_value(value)?).await
}
