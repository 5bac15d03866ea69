//! Upcoming-episode feed for tracked series.

use crate::normalize::next_episode_summary;
use chrono::NaiveDate;
use futures::future::join_all;
use keepup_catalog::CatalogApi;
use keepup_models::Show;
use tracing::{debug, warn};

/// Tracked series that have a next episode announced, soonest first.
///
/// One detail request per series runs concurrently. A series whose request
/// fails is left out. Shows without a parseable air date sort after every
/// dated show; ties keep the tracked-list order.
pub async fn compute_updates_feed(catalog: &dyn CatalogApi, tracked: &[Show]) -> Vec<Show> {
    let series: Vec<&Show> = tracked.iter().filter(|s| s.is_series()).collect();
    debug!("Fetching updates for {} tracked series", series.len());

    let results = join_all(series.iter().map(|show| catalog.tv_detail(&show.id))).await;

    let mut feed: Vec<Show> = series
        .into_iter()
        .zip(results)
        .filter_map(|(show, result)| match result {
            Ok(detail) => {
                let next = detail.next_episode_to_air?;
                let mut update = show.clone();
                update.ai_summary = Some(next_episode_summary(&next));
                update.next_episode_air_date = next.air_date;
                Some(update)
            }
            Err(e) => {
                warn!("Failed to fetch updates for {} ({}): {}", show.title, show.id, e);
                None
            }
        })
        .collect();

    feed.sort_by_key(sort_key);
    feed
}

pub fn parse_air_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Dated shows first, in date order
fn sort_key(show: &Show) -> (bool, Option<NaiveDate>) {
    let date = show.next_air_date().and_then(parse_air_date);
    (date.is_none(), date)
}
