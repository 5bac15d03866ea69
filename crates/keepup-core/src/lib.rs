pub mod auth;
pub mod collections;
pub mod error;
pub mod normalize;
pub mod repository;
pub mod reviews;
pub mod service;
pub mod store;
pub mod subscription;
pub mod tracked;
pub mod transaction;
pub mod updates;
pub mod watch_progress;

pub use auth::{AuthProvider, SessionAuth};
pub use error::{KeepUpError, Result};
pub use normalize::{merge_detail, normalize_search_result, RawDetailPayload};
pub use repository::ShowRepository;
pub use reviews::{apply_vote, recompute_summary};
pub use service::{KeepUp, NewReview, TrackedShowIds};
pub use store::{DocPath, DocumentStore, FileStore, MemoryStore, StoreError};
pub use subscription::Subscription;
pub use tracked::TrackedShowsStore;
pub use transaction::run_transaction;
pub use updates::compute_updates_feed;
pub use watch_progress::merge_watched_episode;
