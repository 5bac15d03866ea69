use async_trait::async_trait;
use crate::error::CatalogError;
use crate::tmdb::dto::{TmdbMovieDetail, TmdbSearchResponse, TmdbSeasonDetail, TmdbTvDetail};

/// Read-only access to the movie/TV catalog.
///
/// Detail lookups return the payload with credits, videos and watch providers
/// appended, so one round trip is enough to enrich a show.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search_multi(&self, query: &str) -> Result<TmdbSearchResponse, CatalogError>;

    async fn movie_detail(&self, id: &str) -> Result<TmdbMovieDetail, CatalogError>;

    async fn tv_detail(&self, id: &str) -> Result<TmdbTvDetail, CatalogError>;

    async fn tv_season(&self, id: &str, season_number: u32) -> Result<TmdbSeasonDetail, CatalogError>;
}
