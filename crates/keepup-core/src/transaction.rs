//! Optimistic read-modify-write over a fixed set of documents.

use crate::error::{KeepUpError, Result};
use crate::store::{DocPath, DocumentStore, Precondition, StoreError, Versioned, WriteOp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Attempts before a conflict is reported to the caller
pub const MAX_ATTEMPTS: usize = 5;

/// Documents read at the start of one attempt
pub struct TxSnapshot {
    docs: HashMap<DocPath, Versioned>,
}

impl TxSnapshot {
    pub fn get(&self, path: &DocPath) -> Option<&Value> {
        self.docs.get(path).and_then(|doc| doc.data.as_ref())
    }

    pub fn get_typed<T: DeserializeOwned>(&self, path: &DocPath) -> Result<Option<T>> {
        match self.get(path) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, path: &DocPath) -> bool {
        self.get(path).is_some()
    }
}

/// Writes staged by the transaction body
#[derive(Default)]
pub struct TxWrites {
    ops: Vec<WriteOp>,
}

impl TxWrites {
    pub fn set(&mut self, path: DocPath, value: Value) {
        self.ops.push(WriteOp::Set(path, value));
    }

    pub fn set_typed<T: Serialize>(&mut self, path: DocPath, value: &T) -> Result<()> {
        self.set(path, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn delete(&mut self, path: DocPath) {
        self.ops.push(WriteOp::Delete(path));
    }
}

/// Read `keys`, run `body` over them and commit its writes.
///
/// The commit is guarded by the versions read, so the writes only land if
/// none of the keys changed in between. On a conflict the body runs again
/// against a fresh read. The body must not have side effects of its own.
pub async fn run_transaction<T, F>(store: &dyn DocumentStore, keys: &[DocPath], mut body: F) -> Result<T>
where
    F: FnMut(&TxSnapshot, &mut TxWrites) -> Result<T>,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let mut docs = HashMap::with_capacity(keys.len());
        let mut preconditions = Vec::with_capacity(keys.len());
        for key in keys {
            let doc = store.get_versioned(key).await?;
            preconditions.push(Precondition {
                path: key.clone(),
                version: doc.version,
            });
            docs.insert(key.clone(), doc);
        }

        let snapshot = TxSnapshot { docs };
        let mut writes = TxWrites::default();
        let output = body(&snapshot, &mut writes)?;

        match store.commit(&preconditions, writes.ops).await {
            Ok(()) => return Ok(output),
            Err(StoreError::Conflict(path)) => {
                debug!("Transaction attempt {}/{} conflicted on {}", attempt, MAX_ATTEMPTS, path);
                tokio::task::yield_now().await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let keys: Vec<&str> = keys.iter().map(DocPath::as_str).collect();
    Err(KeepUpError::Store(StoreError::Conflict(keys.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_body_sees_snapshot_and_writes_commit() {
        let store = MemoryStore::new();
        let counter = DocPath::new("counters/c1");
        store.set(&counter, json!({"n": 1})).await.unwrap();

        let n = run_transaction(&store, &[counter.clone()], |snapshot, writes| {
            let n = snapshot.get(&counter).and_then(|v| v["n"].as_u64()).unwrap_or(0) + 1;
            writes.set(counter.clone(), json!({"n": n}));
            Ok(n)
        })
        .await
        .unwrap();

        assert_eq!(n, 2);
        assert_eq!(store.get(&counter).await.unwrap().unwrap()["n"], 2);
    }

    #[tokio::test]
    async fn test_body_error_writes_nothing() {
        let store = MemoryStore::new();
        let path = DocPath::new("counters/c1");

        let result: Result<()> = run_transaction(&store, &[path.clone()], |snapshot, writes| {
            writes.set(path.clone(), json!({"n": 1}));
            if !snapshot.exists(&path) {
                return Err(KeepUpError::NotFound(path.to_string()));
            }
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(KeepUpError::NotFound(_))));
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let counter = DocPath::new("counters/c1");

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let counter = counter.clone();
                tokio::spawn(async move {
                    run_transaction(store.as_ref(), &[counter.clone()], |snapshot, writes| {
                        let n = snapshot.get(&counter).and_then(|v| v["n"].as_u64()).unwrap_or(0);
                        writes.set(counter.clone(), json!({"n": n + 1}));
                        Ok(())
                    })
                    .await
                })
            })
            .collect();

        let mut committed = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                committed += 1;
            }
        }

        let stored = store.get(&counter).await.unwrap().unwrap()["n"].as_u64().unwrap();
        assert_eq!(stored, committed);
        assert!(committed >= 1);
    }
}
