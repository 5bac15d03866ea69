//! Per-user record of watched episodes.

use crate::collections;
use crate::error::Result;
use crate::store::{get_typed, DocumentStore};
use crate::transaction::run_transaction;
use chrono::{DateTime, Utc};
use keepup_models::{WatchProgress, WatchedEpisode};
use tracing::info;

/// Mark one episode watched at `now`.
///
/// Re-marking an episode replaces its entry, so each (season, episode)
/// appears once. The last-watched pointer always moves to the episode just
/// marked, even when a later episode was watched before.
pub fn merge_watched_episode(
    existing: Option<WatchProgress>,
    show_id: &str,
    season_number: u32,
    episode_number: u32,
    now: DateTime<Utc>,
) -> WatchProgress {
    let mut progress = existing.unwrap_or_else(|| WatchProgress::empty(show_id, now));
    progress
        .watched_episodes
        .retain(|e| !e.is_same_episode(season_number, episode_number));
    progress.watched_episodes.push(WatchedEpisode {
        show_id: show_id.to_string(),
        season_number,
        episode_number,
        watched_at: now,
    });
    progress.last_watched_season = Some(season_number);
    progress.last_watched_episode = Some(episode_number);
    progress.updated_at = now;
    progress
}

pub async fn mark_episode_watched(
    store: &dyn DocumentStore,
    user_id: &str,
    show_id: &str,
    season_number: u32,
    episode_number: u32,
    now: DateTime<Utc>,
) -> Result<WatchProgress> {
    let path = collections::watch_progress(user_id, show_id);
    let progress = run_transaction(store, &[path.clone()], |snapshot, writes| {
        let existing: Option<WatchProgress> = snapshot.get_typed(&path)?;
        let progress = merge_watched_episode(existing, show_id, season_number, episode_number, now);
        writes.set_typed(path.clone(), &progress)?;
        Ok(progress)
    })
    .await?;

    info!(
        "Marked S{}E{} of show {} watched ({} episodes total)",
        season_number,
        episode_number,
        show_id,
        progress.watched_episodes.len()
    );
    Ok(progress)
}

pub async fn get_watch_progress(store: &dyn DocumentStore, user_id: &str, show_id: &str) -> Result<Option<WatchProgress>> {
    Ok(get_typed(store, &collections::watch_progress(user_id, show_id)).await?)
}

/// Remove every watch-progress document of a user; returns how many were removed
pub async fn clear_watch_progress(store: &dyn DocumentStore, user_id: &str) -> Result<usize> {
    let docs = store.list(&collections::watch_progress_collection(user_id)).await?;
    for (path, _) in &docs {
        store.delete(path).await?;
    }
    Ok(docs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    #[test]
    fn test_remark_replaces_entry() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(5);

        let first = merge_watched_episode(None, "42", 2, 5, t1);
        let second = merge_watched_episode(Some(first), "42", 2, 5, t2);

        assert_eq!(second.watched_episodes.len(), 1);
        assert_eq!(second.watched_episodes[0].watched_at, t2);
        assert_eq!(second.last_watched(), Some((2, 5)));
        assert_eq!(second.updated_at, t2);
    }

    #[test]
    fn test_pointer_is_most_recently_marked() {
        let now = Utc::now();
        let mut progress = None;
        for (season, episode) in [(1, 1), (3, 1), (1, 2)] {
            progress = Some(merge_watched_episode(progress, "42", season, episode, now));
        }
        let progress = progress.unwrap();

        assert_eq!(progress.watched_episodes.len(), 3);
        assert_eq!(progress.last_watched(), Some((1, 2)));
        assert!(progress.is_watched(3, 1));
        assert!(!progress.is_watched(2, 1));
    }

    #[tokio::test]
    async fn test_mark_persists_progress() {
        let store = MemoryStore::new();
        let now = Utc::now();
        mark_episode_watched(&store, "u1", "42", 1, 1, now).await.unwrap();
        mark_episode_watched(&store, "u1", "42", 1, 2, now).await.unwrap();

        let stored = get_watch_progress(&store, "u1", "42").await.unwrap().unwrap();
        assert_eq!(stored.watched_episodes.len(), 2);
        assert_eq!(stored.last_watched(), Some((1, 2)));
        assert!(get_watch_progress(&store, "u2", "42").await.unwrap().is_none());

        assert_eq!(clear_watch_progress(&store, "u1").await.unwrap(), 1);
        assert!(get_watch_progress(&store, "u1", "42").await.unwrap().is_none());
    }
}
