use crate::error::CatalogError;
use crate::tmdb::dto::{TmdbMovieDetail, TmdbSearchResponse, TmdbSeasonDetail, TmdbTvDetail};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Sub-resources appended to every detail request so one round trip is enough
pub const DETAIL_APPEND: &str = "credits,videos,watch/providers";

/// Issue a GET against the catalog and decode the JSON body
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    api_key: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<T, CatalogError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
    debug!("GET {}", url);

    let response = client
        .get(&url)
        .query(&[("api_key", api_key)])
        .query(query)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::Status { status: status.as_u16(), body });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Search movies, series and people in one query
pub async fn search_multi(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<TmdbSearchResponse, CatalogError> {
    get_json(client, base_url, api_key, "search/multi", &[("query", query)]).await
}

pub async fn get_movie(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<TmdbMovieDetail, CatalogError> {
    let path = format!("movie/{}", urlencoding::encode(id));
    get_json(client, base_url, api_key, &path, &[("append_to_response", DETAIL_APPEND)]).await
}

pub async fn get_tv(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<TmdbTvDetail, CatalogError> {
    let path = format!("tv/{}", urlencoding::encode(id));
    get_json(client, base_url, api_key, &path, &[("append_to_response", DETAIL_APPEND)]).await
}

/// Episode listing of a single season
pub async fn get_tv_season(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
    season_number: u32,
) -> Result<TmdbSeasonDetail, CatalogError> {
    let path = format!("tv/{}/season/{}", urlencoding::encode(id), season_number);
    get_json(client, base_url, api_key, &path, &[]).await
}
