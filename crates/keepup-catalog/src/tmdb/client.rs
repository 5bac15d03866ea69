use crate::error::CatalogError;
use crate::tmdb::api;
use crate::tmdb::dto::{TmdbMovieDetail, TmdbSearchResponse, TmdbSeasonDetail, TmdbTvDetail};
use crate::traits::CatalogApi;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Result<Self, CatalogError> {
        Self::with_options(api_key, DEFAULT_BASE_URL.to_string(), Duration::from_secs(30))
    }

    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Result<Self, CatalogError> {
        if api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("keepup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("TMDB client ready (base URL {})", base_url);
        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn search_multi(&self, query: &str) -> Result<TmdbSearchResponse, CatalogError> {
        api::search_multi(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn movie_detail(&self, id: &str) -> Result<TmdbMovieDetail, CatalogError> {
        api::get_movie(&self.client, &self.base_url, &self.api_key, id).await
    }

    async fn tv_detail(&self, id: &str) -> Result<TmdbTvDetail, CatalogError> {
        api::get_tv(&self.client, &self.base_url, &self.api_key, id).await
    }

    async fn tv_season(&self, id: &str, season_number: u32) -> Result<TmdbSeasonDetail, CatalogError> {
        api::get_tv_season(&self.client, &self.base_url, &self.api_key, id, season_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(TmdbClient::new("  ".to_string()), Err(CatalogError::MissingApiKey)));
    }

    #[test]
    fn test_client_keeps_base_url() {
        let client = TmdbClient::with_options(
            "key".to_string(),
            "http://localhost:9999/3".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/3");
    }
}
