use serde::{Deserialize, Serialize};
use crate::image::{image_url, ImageSize};
use crate::watch_progress::WatchProgress;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShowType {
    Movie,
    Series,
    Episode,
    Other,
}

impl ShowType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShowType::Movie => "Movie",
            ShowType::Series => "TV Show",
            ShowType::Episode => "Episode",
            ShowType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchProvider {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

impl WatchProvider {
    pub fn logo_url(&self) -> Option<String> {
        self.logo_path.as_deref().map(|p| image_url(ImageSize::Original, p))
    }
}

/// Citation attached to a generated status summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32, // Billing order as reported by the catalog
}

impl CastMember {
    pub fn profile_url(&self) -> Option<String> {
        self.profile_path.as_deref().map(|p| image_url(ImageSize::Profile, p))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub id: u64,
    pub season_number: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

impl SeasonInfo {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(|p| image_url(ImageSize::Still, p))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeInfo {
    pub id: u64,
    pub episode_number: u32,
    pub season_number: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub still_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>, // Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

impl EpisodeInfo {
    pub fn still_url(&self) -> Option<String> {
        self.still_path.as_deref().map(|p| image_url(ImageSize::Still, p))
    }
}

/// A movie or series as shown to the user.
///
/// Created by search mapping with only the required fields and a few images,
/// then enriched by a detail fetch. Everything except the identity, title,
/// year and type is optional enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: String, // Catalog id
    pub title: String,
    pub year: String, // Four-digit year, empty when unknown
    #[serde(rename = "type")]
    pub show_type: ShowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_members: Option<Vec<CastMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_providers: Option<Vec<WatchProvider>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_progress: Option<WatchProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_notification_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_episode_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_episode_air_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<Vec<SeasonInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theatrical_release_date: Option<String>,
}

impl Show {
    pub fn new(id: impl Into<String>, title: impl Into<String>, year: impl Into<String>, show_type: ShowType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: year.into(),
            show_type,
            poster_url: None,
            backdrop_url: None,
            plot: None,
            actors: None,
            director: None,
            runtime: None,
            genre: None,
            rating: None,
            trailer_key: None,
            cast_members: None,
            watch_providers: None,
            watch_progress: None,
            ai_status: None,
            ai_summary: None,
            ai_sources: None,
            is_cached: None,
            is_notification_enabled: None,
            tmdb_status: None,
            last_episode_air_date: None,
            next_episode_air_date: None,
            total_seasons: None,
            total_episodes: None,
            seasons: None,
            theatrical_release_date: None,
        }
    }

    /// Next air date: the structured date when known, otherwise whatever
    /// follows "on " in the next-episode summary.
    pub fn next_air_date(&self) -> Option<&str> {
        self.next_episode_air_date.as_deref().or_else(|| {
            self.ai_summary
                .as_deref()
                .map(|summary| summary.split_once("on ").map(|(_, rest)| rest).unwrap_or(summary))
        })
    }

    pub fn is_series(&self) -> bool {
        self.show_type == ShowType::Series
    }
}
