//! Wire shapes of the TMDB v3 API.
//!
//! Only the fields the app reads are modelled; unknown fields are ignored.
//! Almost everything is optional because the catalog omits or nulls fields
//! freely, especially for obscure titles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
    #[serde(rename = "total_results")]
    pub total_results: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "release_date")]
    pub release_date: Option<String>,
    #[serde(rename = "first_air_date")]
    pub first_air_date: Option<String>,
    #[serde(rename = "media_type")]
    pub media_type: Option<String>,
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(rename = "backdrop_path")]
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbCredits {
    pub cast: Option<Vec<TmdbCast>>,
    pub crew: Option<Vec<TmdbCrew>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCast {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    #[serde(rename = "profile_path")]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCrew {
    pub name: String,
    pub job: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCreator {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbEpisode {
    pub id: u64,
    #[serde(rename = "air_date")]
    pub air_date: Option<String>,
    #[serde(rename = "episode_number")]
    pub episode_number: Option<u32>,
    #[serde(rename = "season_number")]
    pub season_number: Option<u32>,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(rename = "still_path")]
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
    #[serde(rename = "vote_average")]
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSeason {
    pub id: u64,
    #[serde(rename = "season_number")]
    pub season_number: u32,
    pub name: String,
    pub overview: Option<String>,
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(rename = "air_date")]
    pub air_date: Option<String>,
    #[serde(rename = "episode_count", default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSeasonDetail {
    pub id: u64,
    #[serde(rename = "season_number")]
    pub season_number: u32,
    pub name: String,
    pub overview: Option<String>,
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(rename = "air_date")]
    pub air_date: Option<String>,
    pub episodes: Option<Vec<TmdbEpisode>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbMovieDetail {
    pub id: u64,
    pub title: Option<String>,
    pub overview: Option<String>,
    #[serde(rename = "release_date")]
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Option<Vec<TmdbGenre>>,
    #[serde(rename = "vote_average")]
    pub vote_average: Option<f64>,
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(rename = "backdrop_path")]
    pub backdrop_path: Option<String>,
    pub credits: Option<TmdbCredits>,
    pub videos: Option<TmdbVideosResponse>,
    #[serde(rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProvidersResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbTvDetail {
    pub id: u64,
    pub name: Option<String>,
    pub overview: Option<String>,
    #[serde(rename = "first_air_date")]
    pub first_air_date: Option<String>,
    #[serde(rename = "last_air_date")]
    pub last_air_date: Option<String>,
    #[serde(rename = "episode_run_time")]
    pub episode_run_time: Option<Vec<u32>>,
    pub genres: Option<Vec<TmdbGenre>>,
    #[serde(rename = "vote_average")]
    pub vote_average: Option<f64>,
    #[serde(rename = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(rename = "backdrop_path")]
    pub backdrop_path: Option<String>,
    pub credits: Option<TmdbCredits>,
    #[serde(rename = "created_by")]
    pub created_by: Option<Vec<TmdbCreator>>,
    pub status: Option<String>,
    #[serde(rename = "next_episode_to_air")]
    pub next_episode_to_air: Option<TmdbEpisode>,
    #[serde(rename = "last_episode_to_air")]
    pub last_episode_to_air: Option<TmdbEpisode>,
    #[serde(rename = "number_of_seasons")]
    pub number_of_seasons: Option<u32>,
    #[serde(rename = "number_of_episodes")]
    pub number_of_episodes: Option<u32>,
    pub seasons: Option<Vec<TmdbSeason>>,
    pub videos: Option<TmdbVideosResponse>,
    #[serde(rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProvidersResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbVideosResponse {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub site: String,
    pub official: Option<bool>,
    pub name: Option<String>,
}

/// Watch providers keyed by ISO 3166-1 region code ("US", "GB", ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbWatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, TmdbCountryProviders>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbCountryProviders {
    pub flatrate: Option<Vec<TmdbProvider>>,
    pub rent: Option<Vec<TmdbProvider>>,
    pub buy: Option<Vec<TmdbProvider>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbProvider {
    #[serde(rename = "provider_id")]
    pub provider_id: u32,
    #[serde(rename = "provider_name")]
    pub provider_name: String,
    #[serde(rename = "logo_path")]
    pub logo_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_movie_detail_with_appended_resources() {
        let body = r#"{
            "id": 438631,
            "title": "Dune",
            "release_date": "2021-09-15",
            "runtime": 155,
            "genres": [{"id": 878, "name": "Science Fiction"}],
            "vote_average": 7.8,
            "credits": {
                "cast": [{"id": 1190668, "name": "Timothée Chalamet", "character": "Paul Atreides", "profile_path": "/p.jpg", "order": 0}],
                "crew": [{"name": "Denis Villeneuve", "job": "Director"}]
            },
            "videos": {"results": [{"key": "n9xhJrPXop4", "type": "Trailer", "site": "YouTube", "official": true, "name": "Main Trailer"}]},
            "watch/providers": {"results": {"US": {"flatrate": [{"provider_id": 1899, "provider_name": "Max", "logo_path": "/max.jpg"}]}}},
            "unknown_field": 1
        }"#;

        let detail: TmdbMovieDetail = serde_json::from_str(body).unwrap();
        assert_eq!(detail.title.as_deref(), Some("Dune"));
        assert_eq!(detail.credits.as_ref().unwrap().crew.as_ref().unwrap()[0].job, "Director");
        assert_eq!(detail.videos.as_ref().unwrap().results[0].video_type, "Trailer");
        let providers = detail.watch_providers.unwrap();
        let us = providers.results.get("US").unwrap();
        assert_eq!(us.flatrate.as_ref().unwrap()[0].provider_name, "Max");
    }

    #[test]
    fn test_decode_tv_detail_with_nulls() {
        let body = r#"{
            "id": 95396,
            "name": "Severance",
            "first_air_date": "2022-02-17",
            "next_episode_to_air": null,
            "last_episode_to_air": {"id": 1, "air_date": "2025-03-21", "episode_number": 10, "season_number": 2},
            "seasons": [{"id": 1, "season_number": 1, "name": "Season 1", "episode_count": 9}]
        }"#;

        let detail: TmdbTvDetail = serde_json::from_str(body).unwrap();
        assert!(detail.next_episode_to_air.is_none());
        assert_eq!(detail.last_episode_to_air.unwrap().episode_number, Some(10));
        assert_eq!(detail.seasons.unwrap()[0].episode_count, 9);
        assert!(detail.watch_providers.is_none());
    }

    #[test]
    fn test_decode_search_with_person_result() {
        let body = r#"{
            "results": [
                {"id": 1, "title": "Heat", "release_date": "1995-12-15", "media_type": "movie"},
                {"id": 2, "name": "Al Pacino", "media_type": "person"}
            ],
            "total_results": 2
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].media_type.as_deref(), Some("person"));
        assert!(response.results[1].title.is_none());
    }
}
