use super::{DocPath, DocumentStore, Precondition, StoreError, Versioned, WriteOp, ABSENT_VERSION};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct Entry {
    version: u64,
    data: Value,
}

/// One document as written to a snapshot file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub version: u64,
    pub data: Value,
}

/// Every document with its version, plus the next version to hand out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedSnapshot {
    pub next_version: u64,
    pub documents: BTreeMap<String, StoredDocument>,
}

impl VersionedSnapshot {
    /// Version plain documents in path order, starting at 1
    pub fn from_plain(documents: BTreeMap<String, Value>) -> Self {
        let mut version = ABSENT_VERSION;
        let documents = documents
            .into_iter()
            .map(|(path, data)| {
                version += 1;
                (path, StoredDocument { version, data })
            })
            .collect();
        Self {
            next_version: version + 1,
            documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn into_entries(self) -> (BTreeMap<DocPath, Entry>, u64) {
        let highest = self.documents.values().map(|doc| doc.version).max().unwrap_or(ABSENT_VERSION);
        let entries = self
            .documents
            .into_iter()
            .map(|(path, doc)| (DocPath::new(path), Entry { version: doc.version, data: doc.data }))
            .collect();
        (entries, self.next_version.max(highest + 1))
    }
}

/// Documents held in a map, guarded by a tokio `RwLock`.
///
/// Versions come from one store-wide counter, so a document that is deleted
/// and recreated never reuses a version a reader may still hold.
pub struct MemoryStore {
    docs: RwLock<BTreeMap<DocPath, Entry>>,
    next_version: AtomicU64,
    changes: broadcast::Sender<DocPath>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(BTreeMap::new())
    }

    pub fn from_snapshot(snapshot: BTreeMap<String, Value>) -> Self {
        Self::from_versioned(VersionedSnapshot::from_plain(snapshot))
    }

    pub fn from_versioned(snapshot: VersionedSnapshot) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let (docs, next_version) = snapshot.into_entries();
        Self {
            docs: RwLock::new(docs),
            next_version: AtomicU64::new(next_version),
            changes,
        }
    }

    /// Plain copy of every document keyed by path
    pub async fn snapshot(&self) -> BTreeMap<String, Value> {
        self.docs
            .read()
            .await
            .iter()
            .map(|(path, entry)| (path.as_str().to_string(), entry.data.clone()))
            .collect()
    }

    /// Copy of every document with its version
    pub async fn versioned_snapshot(&self) -> VersionedSnapshot {
        let docs = self.docs.read().await;
        VersionedSnapshot {
            next_version: self.next_version.load(Ordering::SeqCst),
            documents: docs
                .iter()
                .map(|(path, entry)| {
                    let doc = StoredDocument { version: entry.version, data: entry.data.clone() };
                    (path.as_str().to_string(), doc)
                })
                .collect(),
        }
    }

    /// Swap in `snapshot` wholesale and broadcast every path that was added,
    /// removed or moved to another version. Returns how many paths changed.
    pub async fn replace(&self, snapshot: VersionedSnapshot) -> usize {
        let (incoming, next_version) = snapshot.into_entries();
        let changed: Vec<DocPath> = {
            let mut docs = self.docs.write().await;
            let mut changed: Vec<DocPath> = docs
                .iter()
                .filter(|(path, entry)| incoming.get(*path).map_or(true, |new| new.version != entry.version))
                .map(|(path, _)| path.clone())
                .collect();
            changed.extend(incoming.keys().filter(|path| !docs.contains_key(*path)).cloned());
            *docs = incoming;
            self.next_version.fetch_max(next_version, Ordering::SeqCst);
            changed
        };

        let count = changed.len();
        if count > 0 {
            debug!("Reloaded snapshot, {} document(s) changed", count);
        }
        self.notify(changed);
        count
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    fn bump(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst)
    }

    fn notify(&self, paths: impl IntoIterator<Item = DocPath>) {
        for path in paths {
            // No subscribers is fine
            let _ = self.changes.send(path);
        }
    }

    fn collect_collection<'a>(
        docs: &'a BTreeMap<DocPath, Entry>,
        collection: &'a str,
    ) -> impl Iterator<Item = (&'a DocPath, &'a Entry)> + 'a {
        let collection = collection.trim_matches('/');
        docs.iter().filter(move |(path, _)| path.collection() == collection)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(path).map(|entry| entry.data.clone()))
    }

    async fn get_versioned(&self, path: &DocPath) -> Result<Versioned, StoreError> {
        Ok(match self.docs.read().await.get(path) {
            Some(entry) => Versioned {
                version: entry.version,
                data: Some(entry.data.clone()),
            },
            None => Versioned::absent(),
        })
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        {
            let mut docs = self.docs.write().await;
            let version = self.bump();
            docs.insert(path.clone(), Entry { version, data: value });
        }
        debug!("Stored {}", path);
        self.notify([path.clone()]);
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let removed = self.docs.write().await.remove(path).is_some();
        if removed {
            debug!("Deleted {}", path);
            self.notify([path.clone()]);
        }
        Ok(())
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<(DocPath, Value)>, StoreError> {
        let docs = self.docs.read().await;
        Ok(Self::collect_collection(&docs, collection)
            .filter(|(_, entry)| entry.data.get(field) == Some(value))
            .map(|(path, entry)| (path.clone(), entry.data.clone()))
            .collect())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(DocPath, Value)>, StoreError> {
        let docs = self.docs.read().await;
        Ok(Self::collect_collection(&docs, collection)
            .map(|(path, entry)| (path.clone(), entry.data.clone()))
            .collect())
    }

    async fn commit(&self, preconditions: &[Precondition], writes: Vec<WriteOp>) -> Result<(), StoreError> {
        let changed: Vec<DocPath> = {
            let mut docs = self.docs.write().await;

            for precondition in preconditions {
                let current = docs.get(&precondition.path).map_or(ABSENT_VERSION, |entry| entry.version);
                if current != precondition.version {
                    debug!(
                        "Commit rejected: {} is at version {}, expected {}",
                        precondition.path, current, precondition.version
                    );
                    return Err(StoreError::Conflict(precondition.path.to_string()));
                }
            }

            let version = self.bump();
            writes
                .into_iter()
                .map(|write| match write {
                    WriteOp::Set(path, data) => {
                        docs.insert(path.clone(), Entry { version, data });
                        path
                    }
                    WriteOp::Delete(path) => {
                        docs.remove(&path);
                        path
                    }
                })
                .collect()
        };

        debug!("Committed {} write(s)", changed.len());
        self.notify(changed);
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.changes.subscribe()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
