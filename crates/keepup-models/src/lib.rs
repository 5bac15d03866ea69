pub mod image;
pub mod review;
pub mod show;
pub mod user;
pub mod watch_progress;

pub use image::{image_url, ImageSize};
pub use review::{format_rating, Review, ReviewSummary, ReviewTag, VoteCounts, VoteRecord};
pub use show::{CastMember, EpisodeInfo, SeasonInfo, Show, ShowType, Source, WatchProvider};
pub use user::{BugReport, UserIdentity, UserProfile};
pub use watch_progress::{WatchProgress, WatchedEpisode};
