use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEpisode {
    pub show_id: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub watched_at: DateTime<Utc>,
}

impl WatchedEpisode {
    pub fn is_same_episode(&self, season_number: u32, episode_number: u32) -> bool {
        self.season_number == season_number && self.episode_number == episode_number
    }
}

/// Episodes a user has marked watched for one show.
///
/// Entries are unique per (season, episode). `last_watched_*` point at the
/// most recently marked episode, which is not necessarily the furthest one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub show_id: String,
    #[serde(default)]
    pub watched_episodes: Vec<WatchedEpisode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_episode: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl WatchProgress {
    pub fn empty(show_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            show_id: show_id.into(),
            watched_episodes: Vec::new(),
            last_watched_season: None,
            last_watched_episode: None,
            updated_at: now,
        }
    }

    pub fn is_watched(&self, season_number: u32, episode_number: u32) -> bool {
        self.watched_episodes
            .iter()
            .any(|e| e.is_same_episode(season_number, episode_number))
    }

    pub fn last_watched(&self) -> Option<(u32, u32)> {
        self.last_watched_season.zip(self.last_watched_episode)
    }
}
