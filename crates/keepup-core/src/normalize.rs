//! Mapping from catalog wire shapes to `Show`.
//!
//! Search results seed a `Show` with the few fields a listing needs. A detail
//! payload is then merged into the seed: fields the payload carries replace
//! the seed's, fields it omits keep the seed's value.

use keepup_catalog::tmdb::dto::{
    TmdbCast, TmdbCredits, TmdbEpisode, TmdbMovieDetail, TmdbSearchResult, TmdbSeason, TmdbSeasonDetail, TmdbTvDetail,
    TmdbVideosResponse, TmdbWatchProvidersResponse,
};
use keepup_models::{image_url, CastMember, EpisodeInfo, ImageSize, SeasonInfo, Show, ShowType, WatchProvider};

const TOP_BILLED_ACTORS: usize = 5;
const MAX_CAST_MEMBERS: usize = 20;
const PROVIDER_REGION: &str = "US";

/// Detail payload of either kind, as returned for a movie or a series
#[derive(Debug, Clone)]
pub enum RawDetailPayload {
    Movie(TmdbMovieDetail),
    Tv(TmdbTvDetail),
}

/// Map one multi-search hit; people and unclassifiable hits are dropped
pub fn normalize_search_result(raw: &TmdbSearchResult) -> Option<Show> {
    let show_type = match raw.media_type.as_deref() {
        Some("tv") => ShowType::Series,
        Some("movie") => ShowType::Movie,
        _ if raw.title.is_some() => ShowType::Movie,
        _ => return None,
    };

    let title = raw.title.as_deref().or(raw.name.as_deref()).unwrap_or_default();
    let year = raw
        .release_date
        .as_deref()
        .or(raw.first_air_date.as_deref())
        .map(year_of)
        .unwrap_or_default();

    let mut show = Show::new(raw.id.to_string(), title, year, show_type);
    show.poster_url = raw.poster_path.as_deref().map(|p| image_url(ImageSize::Poster, p));
    show.backdrop_url = raw.backdrop_path.as_deref().map(|p| image_url(ImageSize::Backdrop, p));
    Some(show)
}

pub fn merge_detail(seed: Show, detail: &RawDetailPayload) -> Show {
    match detail {
        RawDetailPayload::Movie(movie) => merge_movie_detail(seed, movie),
        RawDetailPayload::Tv(tv) => merge_tv_detail(seed, tv),
    }
}

pub fn merge_movie_detail(seed: Show, detail: &TmdbMovieDetail) -> Show {
    let mut show = seed;
    merge_common(
        &mut show,
        CommonDetail {
            title: detail.title.as_deref(),
            overview: detail.overview.as_deref(),
            date: detail.release_date.as_deref(),
            genres: detail.genres.as_deref().map(|g| g.iter().map(|g| g.name.as_str()).collect()),
            vote_average: detail.vote_average,
            poster_path: detail.poster_path.as_deref(),
            backdrop_path: detail.backdrop_path.as_deref(),
            credits: detail.credits.as_ref(),
            videos: detail.videos.as_ref(),
            providers: detail.watch_providers.as_ref(),
            runtime: detail.runtime,
        },
    );

    if let Some(director) = detail
        .credits
        .as_ref()
        .and_then(|c| c.crew.as_ref())
        .and_then(|crew| crew.iter().find(|member| member.job == "Director"))
    {
        show.director = Some(director.name.clone());
    }
    if detail.release_date.is_some() {
        show.theatrical_release_date = detail.release_date.clone();
    }
    show
}

pub fn merge_tv_detail(seed: Show, detail: &TmdbTvDetail) -> Show {
    let mut show = seed;
    merge_common(
        &mut show,
        CommonDetail {
            title: detail.name.as_deref(),
            overview: detail.overview.as_deref(),
            date: detail.first_air_date.as_deref(),
            genres: detail.genres.as_deref().map(|g| g.iter().map(|g| g.name.as_str()).collect()),
            vote_average: detail.vote_average,
            poster_path: detail.poster_path.as_deref(),
            backdrop_path: detail.backdrop_path.as_deref(),
            credits: detail.credits.as_ref(),
            videos: detail.videos.as_ref(),
            providers: detail.watch_providers.as_ref(),
            runtime: detail.episode_run_time.as_ref().and_then(|times| times.first().copied()),
        },
    );

    if let Some(creators) = detail.created_by.as_deref() {
        show.director = Some(join_names(creators.iter().map(|c| c.name.as_str())));
    }
    if let Some(status) = &detail.status {
        show.tmdb_status = Some(status.clone());
        show.ai_status = Some(status.clone());
    }
    if let Some(last) = detail.last_episode_to_air.as_ref().and_then(|e| e.air_date.clone()) {
        show.last_episode_air_date = Some(last);
    }
    if let Some(next) = &detail.next_episode_to_air {
        if next.air_date.is_some() {
            show.next_episode_air_date = next.air_date.clone();
        }
        show.ai_summary = Some(next_episode_summary(next));
    }
    if detail.number_of_seasons.is_some() {
        show.total_seasons = detail.number_of_seasons;
    }
    if detail.number_of_episodes.is_some() {
        show.total_episodes = detail.number_of_episodes;
    }
    if let Some(seasons) = &detail.seasons {
        show.seasons = Some(seasons.iter().map(season_info).collect());
    }
    show
}

/// "Next Episode: S<season>E<episode> on <air date or TBD>"
pub fn next_episode_summary(episode: &TmdbEpisode) -> String {
    format!(
        "Next Episode: S{}E{} on {}",
        episode.season_number.unwrap_or(0),
        episode.episode_number.unwrap_or(0),
        episode.air_date.as_deref().unwrap_or("TBD")
    )
}

/// Episodes of a season listing; `season_number` fills in entries that omit it
pub fn season_episodes(detail: &TmdbSeasonDetail, season_number: u32) -> Vec<EpisodeInfo> {
    detail
        .episodes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|episode| EpisodeInfo {
            id: episode.id,
            episode_number: episode.episode_number.unwrap_or(0),
            season_number: episode.season_number.unwrap_or(season_number),
            name: episode.name.clone().unwrap_or_default(),
            overview: episode.overview.clone(),
            still_path: episode.still_path.clone(),
            air_date: episode.air_date.clone(),
            runtime: episode.runtime,
            vote_average: episode.vote_average,
        })
        .collect()
}

/// Key of the first official YouTube trailer
pub fn resolve_trailer_key(videos: &TmdbVideosResponse) -> Option<String> {
    videos
        .results
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube" && v.official == Some(true))
        .map(|v| v.key.clone())
}

/// Subscription (flatrate) providers in the US region
pub fn streaming_providers(providers: &TmdbWatchProvidersResponse) -> Option<Vec<WatchProvider>> {
    let region = providers.results.get(PROVIDER_REGION)?;
    let flatrate = region.flatrate.as_ref()?;
    Some(
        flatrate
            .iter()
            .map(|p| WatchProvider {
                id: p.provider_id,
                name: p.provider_name.clone(),
                logo_path: p.logo_path.clone(),
            })
            .collect(),
    )
}

struct CommonDetail<'a> {
    title: Option<&'a str>,
    overview: Option<&'a str>,
    date: Option<&'a str>,
    genres: Option<Vec<&'a str>>,
    vote_average: Option<f64>,
    poster_path: Option<&'a str>,
    backdrop_path: Option<&'a str>,
    credits: Option<&'a TmdbCredits>,
    videos: Option<&'a TmdbVideosResponse>,
    providers: Option<&'a TmdbWatchProvidersResponse>,
    runtime: Option<u32>,
}

fn merge_common(show: &mut Show, detail: CommonDetail<'_>) {
    if let Some(title) = detail.title {
        show.title = title.to_string();
    }
    if let Some(year) = detail.date.map(year_of).filter(|y| !y.is_empty()) {
        show.year = year;
    }
    if let Some(plot) = detail.overview {
        show.plot = Some(plot.to_string());
    }
    if let Some(genres) = detail.genres {
        show.genre = Some(join_names(genres.into_iter()));
    }
    if let Some(rating) = detail.vote_average {
        show.rating = Some(format!("{:.1}", rating));
    }
    if let Some(path) = detail.poster_path {
        show.poster_url = Some(image_url(ImageSize::Poster, path));
    }
    if let Some(path) = detail.backdrop_path {
        show.backdrop_url = Some(image_url(ImageSize::Backdrop, path));
    }
    if let Some(runtime) = detail.runtime {
        show.runtime = Some(format!("{} min", runtime));
    }
    if let Some(cast) = detail.credits.and_then(|c| c.cast.as_deref()) {
        show.actors = Some(join_names(cast.iter().take(TOP_BILLED_ACTORS).map(|c| c.name.as_str())));
        show.cast_members = Some(cast_members(cast));
    }
    if let Some(key) = detail.videos.and_then(resolve_trailer_key) {
        show.trailer_key = Some(key);
    }
    if let Some(providers) = detail.providers.and_then(streaming_providers) {
        show.watch_providers = Some(providers);
    }
}

fn cast_members(cast: &[TmdbCast]) -> Vec<CastMember> {
    let mut billed: Vec<&TmdbCast> = cast.iter().collect();
    billed.sort_by_key(|c| c.order);
    billed
        .into_iter()
        .take(MAX_CAST_MEMBERS)
        .map(|c| CastMember {
            id: c.id,
            name: c.name.clone(),
            character: c.character.clone(),
            profile_path: c.profile_path.clone(),
            order: c.order,
        })
        .collect()
}

fn season_info(season: &TmdbSeason) -> SeasonInfo {
    SeasonInfo {
        id: season.id,
        season_number: season.season_number,
        name: season.name.clone(),
        overview: season.overview.clone(),
        poster_path: season.poster_path.clone(),
        air_date: season.air_date.clone(),
        episode_count: season.episode_count,
    }
}

fn year_of(date: &str) -> String {
    date.chars().take(4).collect()
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
