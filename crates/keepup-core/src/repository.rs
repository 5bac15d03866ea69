use crate::error::Result;
use crate::normalize::{merge_movie_detail, merge_tv_detail, normalize_search_result, season_episodes};
use crate::updates::{compute_updates_feed, parse_air_date};
use keepup_catalog::CatalogApi;
use keepup_models::{EpisodeInfo, Show, ShowType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Catalog reads, already mapped to domain types
#[derive(Clone)]
pub struct ShowRepository {
    catalog: Arc<dyn CatalogApi>,
    include_undated: bool,
}

impl ShowRepository {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            include_undated: true,
        }
    }

    /// Whether the updates feed keeps shows whose next episode has no air date yet
    pub fn with_undated_updates(mut self, include_undated: bool) -> Self {
        self.include_undated = include_undated;
        self
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Show>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.catalog.search_multi(query).await?;
        let shows: Vec<Show> = response.results.iter().filter_map(normalize_search_result).collect();
        debug!("Search '{}' returned {} shows ({} raw results)", query, shows.len(), response.results.len());
        Ok(shows)
    }

    /// Enrich a search seed with its full detail; types without detail pages pass through
    pub async fn fetch_details(&self, show: Show) -> Result<Show> {
        match show.show_type {
            ShowType::Movie => {
                let detail = self.catalog.movie_detail(&show.id).await?;
                Ok(merge_movie_detail(show, &detail))
            }
            ShowType::Series => {
                let detail = self.catalog.tv_detail(&show.id).await?;
                Ok(merge_tv_detail(show, &detail))
            }
            ShowType::Episode | ShowType::Other => Ok(show),
        }
    }

    /// Episodes of one season; empty when the listing cannot be fetched
    pub async fn fetch_season_episodes(&self, show_id: &str, season_number: u32) -> Vec<EpisodeInfo> {
        match self.catalog.tv_season(show_id, season_number).await {
            Ok(detail) => season_episodes(&detail, season_number),
            Err(e) => {
                warn!("Failed to fetch season {} of show {}: {}", season_number, show_id, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_updates(&self, tracked: &[Show]) -> Vec<Show> {
        let mut feed = compute_updates_feed(self.catalog.as_ref(), tracked).await;
        if !self.include_undated {
            feed.retain(|show| show.next_air_date().and_then(parse_air_date).is_some());
        }
        feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use keepup_catalog::tmdb::dto::{
        TmdbEpisode, TmdbMovieDetail, TmdbSearchResponse, TmdbSearchResult, TmdbSeasonDetail, TmdbTvDetail,
    };
    use keepup_catalog::CatalogError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn search_multi(&self, _query: &str) -> std::result::Result<TmdbSearchResponse, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TmdbSearchResponse {
                results: vec![
                    TmdbSearchResult {
                        id: 1,
                        name: Some("Severance".to_string()),
                        media_type: Some("tv".to_string()),
                        ..Default::default()
                    },
                    TmdbSearchResult {
                        id: 2,
                        name: Some("Adam Scott".to_string()),
                        media_type: Some("person".to_string()),
                        ..Default::default()
                    },
                ],
                total_results: Some(2),
            })
        }

        async fn movie_detail(&self, id: &str) -> std::result::Result<TmdbMovieDetail, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TmdbMovieDetail {
                id: id.parse().unwrap_or_default(),
                runtime: Some(120),
                ..Default::default()
            })
        }

        async fn tv_detail(&self, id: &str) -> std::result::Result<TmdbTvDetail, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TmdbTvDetail {
                id: id.parse().unwrap_or_default(),
                number_of_seasons: Some(2),
                next_episode_to_air: Some(TmdbEpisode {
                    id: 3,
                    air_date: match id {
                        "7" => Some("next spring".to_string()),
                        "8" => Some("2030-01-01".to_string()),
                        _ => None,
                    },
                    season_number: Some(2),
                    episode_number: Some(1),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        async fn tv_season(&self, _id: &str, _season_number: u32) -> std::result::Result<TmdbSeasonDetail, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::Status { status: 500, body: "boom".to_string() })
        }
    }

    fn repository() -> (Arc<FakeCatalog>, ShowRepository) {
        let catalog = Arc::new(FakeCatalog::default());
        let repository = ShowRepository::new(catalog.clone());
        (catalog, repository)
    }

    #[tokio::test]
    async fn test_blank_query_skips_network() {
        let (catalog, repository) = repository();
        assert!(repository.search("   ").await.unwrap().is_empty());
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_drops_people() {
        let (_, repository) = repository();
        let shows = repository.search("severance").await.unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].title, "Severance");
        assert!(shows[0].is_series());
    }

    #[tokio::test]
    async fn test_fetch_details_dispatches_on_type() {
        let (catalog, repository) = repository();
        let movie = repository.fetch_details(Show::new("5", "Heat", "1995", ShowType::Movie)).await.unwrap();
        assert_eq!(movie.runtime.as_deref(), Some("120 min"));

        let series = repository.fetch_details(Show::new("6", "Severance", "2022", ShowType::Series)).await.unwrap();
        assert_eq!(series.total_seasons, Some(2));

        let other = Show::new("7", "Clip", "", ShowType::Other);
        assert_eq!(repository.fetch_details(other.clone()).await.unwrap(), other);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_season_failure_degrades_to_empty() {
        let (_, repository) = repository();
        assert!(repository.fetch_season_episodes("6", 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_undated_updates_can_be_excluded() {
        let (_, repository) = repository();
        let tracked = vec![Show::new("6", "Severance", "2022", ShowType::Series)];
        assert_eq!(repository.fetch_updates(&tracked).await.len(), 1);

        let repository = repository.with_undated_updates(false);
        assert!(repository.fetch_updates(&tracked).await.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_air_date_counts_as_undated() {
        let (_, repository) = repository();
        let tracked = vec![
            Show::new("7", "Pluribus", "2025", ShowType::Series),
            Show::new("8", "Andor", "2022", ShowType::Series),
        ];
        assert_eq!(repository.fetch_updates(&tracked).await.len(), 2);

        let repository = repository.with_undated_updates(false);
        let feed = repository.fetch_updates(&tracked).await;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "8");
    }
}
