#![allow(dead_code)]

use async_trait::async_trait;
use keepup_catalog::tmdb::dto::{TmdbEpisode, TmdbMovieDetail, TmdbSearchResponse, TmdbSeasonDetail, TmdbTvDetail};
use keepup_catalog::{CatalogApi, CatalogError};
use keepup_core::store::{Precondition, Versioned, WriteOp};
use keepup_core::{DocPath, DocumentStore, KeepUp, MemoryStore, SessionAuth, StoreError, TrackedShowsStore};
use keepup_models::UserIdentity;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Catalog serving canned series details; unknown ids fail with 404
#[derive(Default)]
pub struct FakeCatalog {
    pub next_air_dates: HashMap<String, String>,
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn search_multi(&self, _query: &str) -> Result<TmdbSearchResponse, CatalogError> {
        Ok(TmdbSearchResponse { results: Vec::new(), total_results: Some(0) })
    }

    async fn movie_detail(&self, id: &str) -> Result<TmdbMovieDetail, CatalogError> {
        Err(CatalogError::Status { status: 404, body: format!("movie {}", id) })
    }

    async fn tv_detail(&self, id: &str) -> Result<TmdbTvDetail, CatalogError> {
        let air_date = self
            .next_air_dates
            .get(id)
            .ok_or_else(|| CatalogError::Status { status: 404, body: format!("tv {}", id) })?;
        Ok(TmdbTvDetail {
            id: id.parse().unwrap_or_default(),
            next_episode_to_air: Some(TmdbEpisode {
                id: 1,
                air_date: Some(air_date.clone()),
                season_number: Some(1),
                episode_number: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    async fn tv_season(&self, id: &str, season_number: u32) -> Result<TmdbSeasonDetail, CatalogError> {
        Err(CatalogError::Status { status: 404, body: format!("tv {} season {}", id, season_number) })
    }
}

/// MemoryStore that counts every call made to it
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        self.hit();
        self.inner.get(path).await
    }

    async fn get_versioned(&self, path: &DocPath) -> Result<Versioned, StoreError> {
        self.hit();
        self.inner.get_versioned(path).await
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        self.hit();
        self.inner.set(path, value).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete(path).await
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.hit();
        self.inner.query_eq(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.hit();
        self.inner.list(collection).await
    }

    async fn commit(&self, preconditions: &[Precondition], writes: Vec<WriteOp>) -> Result<(), StoreError> {
        self.hit();
        self.inner.commit(preconditions, writes).await
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.inner.changes()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.hit();
        self.inner.flush().await
    }
}

/// MemoryStore that yields after each versioned read and before each commit,
/// so transactions running side by side read before either of them writes
#[derive(Default)]
pub struct YieldingStore {
    pub inner: MemoryStore,
    pub conflicts: AtomicUsize,
}

impl YieldingStore {
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for YieldingStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        self.inner.get(path).await
    }

    async fn get_versioned(&self, path: &DocPath) -> Result<Versioned, StoreError> {
        let doc = self.inner.get_versioned(path).await;
        tokio::task::yield_now().await;
        doc
    }

    async fn set(&self, path: &DocPath, value: Value) -> Result<(), StoreError> {
        self.inner.set(path, value).await
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        self.inner.delete(path).await
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.inner.query_eq(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(DocPath, Value)>, StoreError> {
        self.inner.list(collection).await
    }

    async fn commit(&self, preconditions: &[Precondition], writes: Vec<WriteOp>) -> Result<(), StoreError> {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let result = self.inner.commit(preconditions, writes).await;
        if matches!(result, Err(StoreError::Conflict(_))) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    fn changes(&self) -> broadcast::Receiver<DocPath> {
        self.inner.changes()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.inner.flush().await
    }
}

pub fn identity(user_id: &str) -> UserIdentity {
    UserIdentity {
        user_id: user_id.to_string(),
        display_name: format!("User {}", user_id),
        email: Some(format!("{}@example.com", user_id)),
    }
}

/// Service over a fresh in-memory store, signed out
pub fn service_with(store: Arc<dyn DocumentStore>, catalog: FakeCatalog) -> KeepUp {
    KeepUp::new(store, Arc::new(SessionAuth::new()), Arc::new(catalog), TrackedShowsStore::in_memory())
}

pub fn service() -> (Arc<MemoryStore>, KeepUp) {
    let store = Arc::new(MemoryStore::new());
    let service = service_with(store.clone(), FakeCatalog::default());
    (store, service)
}
