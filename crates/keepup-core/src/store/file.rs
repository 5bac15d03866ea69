use super::{DocPath, DocumentStore, MemoryStore, Precondition, StoreError, Versioned, VersionedSnapshot, WriteOp};
use async_trait::async_trait;
use fs2::FileExt;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// How often an open store checks the file for writes from other processes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Snapshot files written before versions were persisted hold a plain map
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Versioned(VersionedSnapshot),
    Plain(BTreeMap<String, Value>),
}

impl From<SnapshotFile> for VersionedSnapshot {
    fn from(file: SnapshotFile) -> Self {
        match file {
            SnapshotFile::Versioned(snapshot) => snapshot,
            SnapshotFile::Plain(documents) => VersionedSnapshot::from_plain(documents),
        }
    }
}

fn parse_snapshot(content: &str) -> Result<VersionedSnapshot, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(VersionedSnapshot::default());
    }
    serde_json::from_str::<SnapshotFile>(content).map(VersionedSnapshot::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

async fn file_stamp(path: &Path) -> Result<Option<FileStamp>, StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(FileStamp {
            modified: meta.modified()?,
            len: meta.len(),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Cache of the snapshot file plus the stamp of the copy it was loaded from
struct Snapshot {
    docs: Arc<MemoryStore>,
    path: PathBuf,
    seen: Mutex<Option<FileStamp>>,
}

impl Snapshot {
    /// Reload the file into the cache when it changed since the last read,
    /// or unconditionally with `force`. Returns how many documents changed.
    async fn refresh(&self, force: bool) -> Result<usize, StoreError> {
        let mut seen = self.seen.lock().await;
        let Some(stamp) = file_stamp(&self.path).await? else {
            return Ok(0);
        };
        if !force && *seen == Some(stamp) {
            return Ok(0);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        *seen = Some(stamp);
        match parse_snapshot(&content) {
            Ok(snapshot) => Ok(self.docs.replace(snapshot).await),
            Err(e) => {
                warn!("Ignoring unreadable store file {:?}: {}", self.path, e);
                Ok(0)
            }
        }
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let mut seen = self.seen.lock().await;
        let snapshot = self.docs.versioned_snapshot().await;
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        *seen = file_stamp(&self.path).await?;

        debug!("Store saved: {:?} ({} documents)", self.path, snapshot.len());
        Ok(())
    }
}

/// Held for the whole read-check-write-persist cycle of one write
struct WriteGuard<'a> {
    _local: MutexGuard<'a, ()>,
    _file: File,
}

/// `MemoryStore` persisted to a JSON snapshot file that several processes
/// may share.
///
/// Every write takes an exclusive lock on `<file>.lock`, reloads the
/// snapshot, applies the write against the reloaded versions and rewrites
/// the file through a temp file and a rename. Dropping the guard releases
/// the lock. Reads reload first when the file changed, and a background
/// task polls the file so `changes()` also reports writes made elsewhere.
pub struct FileStore {
    snapshot: Arc<Snapshot>,
    lock_path: PathBuf,
    write_lock: Mutex<()>,
    watcher: JoinHandle<()>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_poll_interval(path, DEFAULT_POLL_INTERVAL).await
    }

    /// Must be called inside a tokio runtime; the file watcher is spawned on it
    pub async fn open_with_poll_interval(path: impl Into<PathBuf>, poll_interval: Duration) -> Result<Self, StoreError> {
        let path = path.into();
        let loaded = Self::load_snapshot(&path).await?;
        info!("Opened document store {:?} ({} documents)", path, loaded.len());

        let snapshot = Arc::new(Snapshot {
            docs: Arc::new(MemoryStore::from_versioned(loaded)),
            seen: Mutex::new(file_stamp(&path).await?),
            path: path.clone(),
        });
        let watcher = tokio::spawn(watch_file(snapshot.clone(), poll_interval));

        Ok(Self {
            snapshot,
            lock_path: path.with_extension("json.lock"),
            write_lock: Mutex::new(()),
            watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.snapshot.path
    }

    async fn load_snapshot(path: &Path) -> Result<VersionedSnapshot, StoreError> {
        if !tokio::fs::try_exists(path).await? {
            debug!("Store file {:?} does not exist, starting empty", path);
            return Ok(VersionedSnapshot::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        match parse_snapshot(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let backup = path.with_extension("json.bak");
                warn!("Store file {:?} is corrupt ({}), moving it to {:?}", path, e, backup);
                tokio::fs::rename(path, &backup).await?;
                Ok(VersionedSnapshot::default())
            }
        }
    }

    /// Serialize writers in this process, then across processes, then load
    /// whatever the last writer left on disk.
    async fn begin_write(&self) -> Result<WriteGuard<'_>, StoreError> {
        let local = self.write_lock.lock().await;
        let lock_path = self.lock_path.clone();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            if let Some(parent) = lock_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).truncate(false).write(true).open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("store lock task failed: {}", e)))??;

        self.snapshot.refresh(true).await?;
        Ok(WriteGuard { _local: local, _file: file })
    }
}

async fn watch_file(snapshot: Arc<Snapshot>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        match snapshot.refresh(false).await {
            Ok(0) => {}
            Ok(changed) => debug!("Picked up {} changed document(s) from {:?}", changed, snapshot.path),
            Err(e) => warn!("Failed to reload store {:?}: {}", snapshot.path, e),
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        self.snapshot.refresh(false).await?;
        self.snapshot.docs.get(path).await
    }

    async fn get_versioned(&self, path: &DocPath) -> Result<Versioned, StoreError> {
        self.snapshot.refresh(false).await?;
        self.snapshot.docs.get_versioned(path).await
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        let _guard = self.begin_write().await?;
        self.snapshot.docs.set(path, value).await?;
        self.snapshot.persist().await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let _guard = self.begin_write().await?;
        self.snapshot.docs.delete(path).await?;
        self.snapshot.persist().await
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.snapshot.refresh(false).await?;
        self.snapshot.docs.query_eq(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.snapshot.refresh(false).await?;
        self.snapshot.docs.list(collection).await
    }

    async fn commit(&self, preconditions: &[Precondition], writes: Vec<WriteOp>) -> Result<(), StoreError> {
        let _guard = self.begin_write().await?;
        self.snapshot.docs.commit(preconditions, writes).await?;
        self.snapshot.persist().await
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.snapshot.docs.changes()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.begin_write().await?;
        self.snapshot.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections;
    use crate::reviews::{apply_vote, submit_review};
    use keepup_models::{Review, VoteCounts};
    use serde_json::json;

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let store = FileStore::open(&file).await.unwrap();
        store.set(&DocPath::new("users/u1"), json!({"displayName": "Ann"})).await.unwrap();
        store.set(&DocPath::new("users/u2"), json!({"displayName": "Bo"})).await.unwrap();
        store.delete(&DocPath::new("users/u2")).await.unwrap();
        let version = store.get_versioned(&DocPath::new("users/u1")).await.unwrap().version;
        drop(store);

        let reopened = FileStore::open(&file).await.unwrap();
        let users = reopened.list("users").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].1["displayName"], "Ann");
        assert_eq!(reopened.get_versioned(&DocPath::new("users/u1")).await.unwrap().version, version);
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        std::fs::write(&file, "{not json").unwrap();

        let store = FileStore::open(&file).await.unwrap();
        assert!(store.list("users").await.unwrap().is_empty());
        assert!(dir.path().join("store.json.bak").exists());
    }

    #[tokio::test]
    async fn test_plain_snapshot_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        std::fs::write(&file, r#"{"users/u1": {"displayName": "Ann"}}"#).unwrap();

        let store = FileStore::open(&file).await.unwrap();
        let doc = store.get_versioned(&DocPath::new("users/u1")).await.unwrap();
        assert_eq!(doc.data.unwrap()["displayName"], "Ann");
        assert_eq!(doc.version, 1);

        store.set(&DocPath::new("users/u2"), json!({})).await.unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written["nextVersion"], 3);
        assert_eq!(written["documents"]["users/u1"]["version"], 1);
    }

    #[tokio::test]
    async fn test_stale_commit_from_other_handle_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");
        let counter = DocPath::new("reviews/r1");

        let first = FileStore::open(&file).await.unwrap();
        first.set(&counter, json!({"helpfulCount": 0})).await.unwrap();
        let second = FileStore::open(&file).await.unwrap();
        let stale = second.get_versioned(&counter).await.unwrap();

        let fresh = first.get_versioned(&counter).await.unwrap();
        first
            .commit(
                &[Precondition { path: counter.clone(), version: fresh.version }],
                vec![WriteOp::Set(counter.clone(), json!({"helpfulCount": 1}))],
            )
            .await
            .unwrap();

        let result = second
            .commit(
                &[Precondition { path: counter.clone(), version: stale.version }],
                vec![WriteOp::Set(counter.clone(), json!({"helpfulCount": 5}))],
            )
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let reopened = FileStore::open(&file).await.unwrap();
        assert_eq!(reopened.get(&counter).await.unwrap().unwrap()["helpfulCount"], 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_votes_through_two_handles_both_count() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let setup = FileStore::open(&file).await.unwrap();
        let review = Review::new("42", "author", "Author", 4.0, "Great");
        submit_review(&setup, &review).await.unwrap();
        drop(setup);

        let first = FileStore::open(&file).await.unwrap();
        let second = FileStore::open(&file).await.unwrap();
        apply_vote(&first, &review.id, "alice", true).await.unwrap();
        let counts = apply_vote(&second, &review.id, "bob", true).await.unwrap();
        assert_eq!(counts, VoteCounts { helpful: 2, not_helpful: 0 });

        let (carol, dave) = tokio::join!(
            apply_vote(&first, &review.id, "carol", false),
            apply_vote(&second, &review.id, "dave", false),
        );
        carol.unwrap();
        dave.unwrap();
        drop(first);
        drop(second);

        let reopened = FileStore::open(&file).await.unwrap();
        let stored = reopened.get(&collections::review(&review.id)).await.unwrap().unwrap();
        assert_eq!(stored["helpfulCount"], 2);
        assert_eq!(stored["notHelpfulCount"], 2);
        for voter in ["alice", "bob", "carol", "dave"] {
            assert!(reopened.get(&collections::review_vote(&review.id, voter)).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_writes_from_other_handle_are_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let follower = FileStore::open_with_poll_interval(&file, Duration::from_millis(20)).await.unwrap();
        let mut rx = follower.changes();

        let writer = FileStore::open(&file).await.unwrap();
        writer.set(&DocPath::new("reviews/r1"), json!({"showId": "42"})).await.unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        assert_eq!(changed.as_str(), "reviews/r1");
        assert_eq!(follower.list("reviews").await.unwrap().len(), 1);
    }
}
