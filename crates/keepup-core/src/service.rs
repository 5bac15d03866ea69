//! The `KeepUp` service handle: every user-facing operation in one place.

use crate::auth::{AuthProvider, SessionAuth};
use crate::collections;
use crate::error::{KeepUpError, Result};
use crate::repository::ShowRepository;
use crate::reviews;
use crate::store::{get_typed, set_typed, DocumentStore, FileStore};
use crate::subscription::Subscription;
use crate::tracked::TrackedShowsStore;
use crate::watch_progress;
use chrono::{DateTime, Utc};
use keepup_catalog::{CatalogApi, CatalogError, TmdbClient};
use keepup_config::{Config, CredentialStore, PathManager};
use keepup_models::{
    BugReport, EpisodeInfo, Review, ReviewSummary, ReviewTag, Show, UserIdentity, UserProfile, VoteCounts,
    WatchProgress,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const BUG_REPORT_OPEN: &str = "open";

/// Cloud copy of the tracked list: ids only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedShowIds {
    pub show_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Review fields supplied by the author; identity and counters are filled in on submit
#[derive(Debug, Clone, Default)]
pub struct NewReview {
    pub show_id: String,
    pub rating: f64,
    pub text: String,
    pub tags: Vec<ReviewTag>,
    pub is_spoiler: bool,
}

#[derive(Clone)]
pub struct KeepUp {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    repository: ShowRepository,
    tracked: Arc<TrackedShowsStore>,
}

impl KeepUp {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        catalog: Arc<dyn CatalogApi>,
        tracked: TrackedShowsStore,
    ) -> Self {
        Self {
            store,
            auth,
            repository: ShowRepository::new(catalog),
            tracked: Arc::new(tracked),
        }
    }

    /// Wire up the file-backed store, the TMDB client and the saved session
    pub async fn open(config: &Config, paths: &PathManager, credentials: &CredentialStore) -> Result<Self> {
        let api_key = credentials.get_tmdb_api_key().ok_or(CatalogError::MissingApiKey)?;
        let catalog = TmdbClient::with_options(
            api_key.clone(),
            config.tmdb.base_url.clone(),
            Duration::from_secs(config.tmdb.request_timeout_seconds),
        )?;

        let store_path = config.store.path.clone().unwrap_or_else(|| paths.store_file());
        let store = FileStore::open(store_path).await?;
        let tracked = TrackedShowsStore::open(paths.preferences_file())?;
        let auth = SessionAuth::with_user(credentials.get_session());

        Ok(Self::new(Arc::new(store), Arc::new(auth), Arc::new(catalog), tracked)
            .with_undated_updates(config.updates.include_undated))
    }

    pub fn with_undated_updates(mut self, include_undated: bool) -> Self {
        self.repository = self.repository.with_undated_updates(include_undated);
        self
    }

    pub fn repository(&self) -> &ShowRepository {
        &self.repository
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    // Accounts

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.auth.current_user()
    }

    pub fn auth_state(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.auth.subscribe()
    }

    fn require_user(&self) -> Result<UserIdentity> {
        self.auth.current_user().ok_or(KeepUpError::NotSignedIn)
    }

    /// Record the identity and create its profile document if there is none yet
    pub async fn sign_in(&self, identity: UserIdentity) -> Result<()> {
        collections::check_id("user", &identity.user_id)?;
        self.auth.sign_in(identity.clone());
        if let Err(e) = self.ensure_profile(&identity).await {
            warn!("Failed to create profile for {}: {}", identity.user_id, e);
        }
        Ok(())
    }

    async fn ensure_profile(&self, identity: &UserIdentity) -> Result<()> {
        let path = collections::user(&identity.user_id);
        if self.store.get(&path).await?.is_some() {
            debug!("Profile for {} already exists", identity.user_id);
            return Ok(());
        }
        set_typed(self.store.as_ref(), &path, &UserProfile::for_identity(identity, Utc::now())).await?;
        info!("Created profile for {}", identity.user_id);
        Ok(())
    }

    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        let user = self.require_user()?;
        Ok(get_typed(self.store.as_ref(), &collections::user(&user.user_id)).await?)
    }

    /// Clear the identity and the local tracked list
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out();
        self.tracked.clear()
    }

    /// Remove the signed-in user's data, then sign out.
    ///
    /// Each removal is best-effort; failures are logged and the account is
    /// still considered deleted.
    pub async fn delete_account(&self) -> Result<()> {
        let user = self.require_user()?;
        let user_id = user.user_id.as_str();

        if let Err(e) = self.delete_authored_reviews(user_id).await {
            warn!("Failed to delete reviews of {}: {}", user_id, e);
        }
        if let Err(e) = watch_progress::clear_watch_progress(self.store.as_ref(), user_id).await {
            warn!("Failed to delete watch progress of {}: {}", user_id, e);
        }
        if let Err(e) = self.store.delete(&collections::tracked_shows(user_id)).await {
            warn!("Failed to delete tracked list of {}: {}", user_id, e);
        }
        if let Err(e) = self.store.delete(&collections::user(user_id)).await {
            warn!("Failed to delete profile of {}: {}", user_id, e);
        }

        info!("Deleted account {}", user_id);
        self.sign_out().await
    }

    async fn delete_authored_reviews(&self, user_id: &str) -> Result<()> {
        let authored = reviews::reviews_by_author(self.store.as_ref(), user_id).await?;
        let shows: BTreeSet<String> = authored.iter().map(|r| r.show_id.clone()).collect();
        for review in &authored {
            reviews::delete_review(self.store.as_ref(), &review.id).await?;
        }
        for show_id in &shows {
            if let Err(e) = reviews::refresh_summary(self.store.as_ref(), show_id).await {
                warn!("Failed to update review summary for show {}: {}", show_id, e);
            }
        }
        debug!("Deleted {} reviews of {}", authored.len(), user_id);
        Ok(())
    }

    // Catalog

    pub async fn search(&self, query: &str) -> Result<Vec<Show>> {
        self.repository.search(query).await
    }

    pub async fn fetch_details(&self, show: Show) -> Result<Show> {
        self.repository.fetch_details(show).await
    }

    pub async fn fetch_season_episodes(&self, show_id: &str, season_number: u32) -> Vec<EpisodeInfo> {
        self.repository.fetch_season_episodes(show_id, season_number).await
    }

    /// Updates feed for the locally tracked shows
    pub async fn fetch_updates(&self) -> Vec<Show> {
        self.repository.fetch_updates(&self.tracked.shows()).await
    }

    // Tracked shows

    pub fn tracked_shows(&self) -> Vec<Show> {
        self.tracked.shows()
    }

    pub fn subscribe_tracked(&self) -> watch::Receiver<Vec<Show>> {
        self.tracked.subscribe()
    }

    /// Track or untrack locally, then mirror the list to the cloud when signed in
    pub async fn toggle_tracked(&self, show: Show) -> Result<bool> {
        let now_tracked = self.tracked.toggle(show)?;
        if self.auth.current_user().is_some() {
            if let Err(e) = self.sync_tracked_shows(&self.tracked.shows()).await {
                warn!("Failed to sync tracked shows: {}", e);
            }
        }
        Ok(now_tracked)
    }

    pub async fn sync_tracked_shows(&self, shows: &[Show]) -> Result<()> {
        let user = self.require_user()?;
        let doc = TrackedShowIds {
            show_ids: shows.iter().map(|s| s.id.clone()).collect(),
            updated_at: Utc::now(),
        };
        set_typed(self.store.as_ref(), &collections::tracked_shows(&user.user_id), &doc).await?;
        debug!("Synced {} tracked show ids for {}", doc.show_ids.len(), user.user_id);
        Ok(())
    }

    pub async fn get_tracked_show_ids(&self) -> Result<Vec<String>> {
        let user = self.require_user()?;
        let doc: Option<TrackedShowIds> =
            get_typed(self.store.as_ref(), &collections::tracked_shows(&user.user_id)).await?;
        Ok(doc.map(|d| d.show_ids).unwrap_or_default())
    }

    // Reviews

    /// Publish a review as the signed-in user
    pub async fn submit_review(&self, new_review: NewReview) -> Result<Review> {
        collections::check_id("show", &new_review.show_id)?;
        let user = self.require_user()?;
        let mut review = Review::new(
            new_review.show_id,
            user.user_id,
            user.display_name,
            new_review.rating,
            new_review.text,
        );
        review.tags = new_review.tags;
        review.is_spoiler = new_review.is_spoiler;

        reviews::submit_review(self.store.as_ref(), &review).await?;
        Ok(review)
    }

    pub async fn vote_review(&self, review_id: &str, is_helpful: bool) -> Result<VoteCounts> {
        collections::check_id("review", review_id)?;
        let user = self.require_user()?;
        reviews::apply_vote(self.store.as_ref(), review_id, &user.user_id, is_helpful).await
    }

    pub async fn list_reviews(&self, show_id: &str) -> Result<Vec<Review>> {
        collections::check_id("show", show_id)?;
        let viewer = self.auth.current_user();
        reviews::list_reviews(self.store.as_ref(), show_id, viewer.as_ref().map(|u| u.user_id.as_str())).await
    }

    pub async fn get_review_summary(&self, show_id: &str) -> Result<Option<ReviewSummary>> {
        collections::check_id("show", show_id)?;
        reviews::get_review_summary(self.store.as_ref(), show_id).await
    }

    /// Deliver the show's reviews now and after every review or vote change.
    ///
    /// Must be called from within a tokio runtime.
    pub fn observe_reviews<F>(&self, show_id: &str, callback: F) -> Subscription
    where
        F: Fn(Vec<Review>) + Send + Sync + 'static,
    {
        let service = self.clone();
        let show_id = show_id.to_string();
        let mut changes = self.store.changes();

        Subscription::spawn(async move {
            service.deliver_reviews(&show_id, &callback).await;
            loop {
                match changes.recv().await {
                    Ok(path) if path.is_within(collections::REVIEWS) => {}
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => debug!("Review feed skipped {} changes", skipped),
                    Err(RecvError::Closed) => break,
                }
                service.deliver_reviews(&show_id, &callback).await;
            }
        })
    }

    async fn deliver_reviews<F>(&self, show_id: &str, callback: &F)
    where
        F: Fn(Vec<Review>),
    {
        match self.list_reviews(show_id).await {
            Ok(reviews) => callback(reviews),
            Err(e) => warn!("Failed to load reviews for show {}: {}", show_id, e),
        }
    }

    // Watch progress

    pub async fn mark_episode_watched(&self, show_id: &str, season_number: u32, episode_number: u32) -> Result<WatchProgress> {
        collections::check_id("show", show_id)?;
        let user = self.require_user()?;
        watch_progress::mark_episode_watched(
            self.store.as_ref(),
            &user.user_id,
            show_id,
            season_number,
            episode_number,
            Utc::now(),
        )
        .await
    }

    pub async fn get_watch_progress(&self, show_id: &str) -> Result<Option<WatchProgress>> {
        collections::check_id("show", show_id)?;
        let user = self.require_user()?;
        watch_progress::get_watch_progress(self.store.as_ref(), &user.user_id, show_id).await
    }

    // Bug reports

    pub async fn submit_bug_report(&self, title: &str, description: &str, device_info: &str) -> Result<BugReport> {
        if title.trim().is_empty() {
            return Err(KeepUpError::InvalidInput("bug report title cannot be empty".to_string()));
        }

        let report = BugReport {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.auth.current_user().map(|u| u.user_id),
            title: title.to_string(),
            description: description.to_string(),
            device_info: device_info.to_string(),
            created_at: Utc::now(),
            status: BUG_REPORT_OPEN.to_string(),
        };
        set_typed(self.store.as_ref(), &collections::bug_report(&report.id), &report).await?;
        info!("Bug report {} filed", report.id);
        Ok(report)
    }

    /// Flush pending store writes
    pub async fn shutdown(&self) -> Result<()> {
        self.store.flush().await?;
        Ok(())
    }
}
