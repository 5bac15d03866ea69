//! Review storage, per-show summaries and helpful votes.

use crate::collections;
use crate::error::{KeepUpError, Result};
use crate::store::{get_typed, set_typed, DocPath, DocumentStore};
use crate::transaction::run_transaction;
use keepup_models::review::{MAX_RATING, MIN_RATING};
use keepup_models::{Review, ReviewSummary, VoteCounts, VoteRecord};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const HELPFUL_FIELD: &str = "helpfulCount";
const NOT_HELPFUL_FIELD: &str = "notHelpfulCount";

/// Summary over every review of a show; `None` when there are no reviews
pub fn recompute_summary(show_id: &str, reviews: &[Review]) -> Option<ReviewSummary> {
    if reviews.is_empty() {
        return None;
    }

    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    let mut distribution = BTreeMap::new();
    for review in reviews {
        let bucket = review.rating.floor().clamp(MIN_RATING, MAX_RATING) as u8;
        *distribution.entry(bucket).or_insert(0u32) += 1;
    }

    Some(ReviewSummary {
        show_id: show_id.to_string(),
        average_rating: total / reviews.len() as f64,
        total_reviews: reviews.len() as u32,
        rating_distribution: distribution,
    })
}

/// Counters after replacing `prior` with a new vote
pub fn tally_vote(counts: VoteCounts, prior: Option<bool>, is_helpful: bool) -> VoteCounts {
    let mut counts = counts;
    match prior {
        Some(true) => counts.helpful = counts.helpful.saturating_sub(1),
        Some(false) => counts.not_helpful = counts.not_helpful.saturating_sub(1),
        None => {}
    }
    if is_helpful {
        counts.helpful += 1;
    } else {
        counts.not_helpful += 1;
    }
    counts
}

/// Store a new review, then refresh its show's summary.
///
/// The summary refresh is best-effort: a failure there is logged and the
/// review still counts as submitted.
pub async fn submit_review(store: &dyn DocumentStore, review: &Review) -> Result<()> {
    if !review.has_valid_rating() {
        return Err(KeepUpError::InvalidInput(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, review.rating
        )));
    }

    set_typed(store, &collections::review(&review.id), review).await?;
    info!("Review {} submitted for show {}", review.id, review.show_id);

    if let Err(e) = refresh_summary(store, &review.show_id).await {
        warn!("Failed to update review summary for show {}: {}", review.show_id, e);
    }
    Ok(())
}

/// Recompute and store the summary of a show from its current reviews.
///
/// With no reviews left the stored summary is left untouched.
pub async fn refresh_summary(store: &dyn DocumentStore, show_id: &str) -> Result<Option<ReviewSummary>> {
    let reviews = reviews_for_show(store, show_id).await?;
    let summary = recompute_summary(show_id, &reviews);
    match &summary {
        Some(summary) => {
            set_typed(store, &collections::review_summary(show_id), summary).await?;
            debug!("Summary for show {}: {:.2} over {} reviews", show_id, summary.average_rating, summary.total_reviews);
        }
        None => debug!("No reviews for show {}, summary unchanged", show_id),
    }
    Ok(summary)
}

/// Record `user_id`'s vote on a review and return the resulting counters.
///
/// Runs as one transaction over the review and the user's vote record, so
/// concurrent voters never lose each other's counts.
pub async fn apply_vote(store: &dyn DocumentStore, review_id: &str, user_id: &str, is_helpful: bool) -> Result<VoteCounts> {
    let review_path = collections::review(review_id);
    let vote_path = collections::review_vote(review_id, user_id);

    let counts = run_transaction(store, &[review_path.clone(), vote_path.clone()], |snapshot, writes| {
        let mut review = snapshot
            .get(&review_path)
            .cloned()
            .ok_or_else(|| KeepUpError::NotFound(format!("review {}", review_id)))?;
        let prior: Option<VoteRecord> = snapshot.get_typed(&vote_path)?;

        let current = VoteCounts {
            helpful: counter(&review, HELPFUL_FIELD),
            not_helpful: counter(&review, NOT_HELPFUL_FIELD),
        };
        let counts = tally_vote(current, prior.map(|v| v.is_helpful), is_helpful);

        if let Some(fields) = review.as_object_mut() {
            fields.insert(HELPFUL_FIELD.to_string(), json!(counts.helpful));
            fields.insert(NOT_HELPFUL_FIELD.to_string(), json!(counts.not_helpful));
        }
        writes.set(review_path.clone(), review);
        writes.set_typed(vote_path.clone(), &VoteRecord { is_helpful })?;
        Ok(counts)
    })
    .await?;

    info!(
        "Vote recorded on review {} ({}): {} helpful / {} not helpful",
        review_id,
        if is_helpful { "helpful" } else { "not helpful" },
        counts.helpful,
        counts.not_helpful
    );
    Ok(counts)
}

/// Reviews of a show, newest first, with `viewer`'s own votes filled in
pub async fn list_reviews(store: &dyn DocumentStore, show_id: &str, viewer: Option<&str>) -> Result<Vec<Review>> {
    let mut reviews = reviews_for_show(store, show_id).await?;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if let Some(user_id) = viewer {
        for review in &mut reviews {
            let vote: Option<VoteRecord> = get_typed(store, &collections::review_vote(&review.id, user_id)).await?;
            review.user_voted_helpful = vote.map(|v| v.is_helpful);
        }
    }
    Ok(reviews)
}

pub async fn get_review_summary(store: &dyn DocumentStore, show_id: &str) -> Result<Option<ReviewSummary>> {
    Ok(get_typed(store, &collections::review_summary(show_id)).await?)
}

/// Reviews written by one user, across all shows
pub async fn reviews_by_author(store: &dyn DocumentStore, user_id: &str) -> Result<Vec<Review>> {
    decode_reviews(store.query_eq(collections::REVIEWS, "userId", &json!(user_id)).await?)
}

/// Delete a review along with every vote cast on it
pub async fn delete_review(store: &dyn DocumentStore, review_id: &str) -> Result<()> {
    for (path, _) in store.list(&collections::review_votes_collection(review_id)).await? {
        store.delete(&path).await?;
    }
    store.delete(&collections::review(review_id)).await?;
    debug!("Deleted review {}", review_id);
    Ok(())
}

async fn reviews_for_show(store: &dyn DocumentStore, show_id: &str) -> Result<Vec<Review>> {
    decode_reviews(store.query_eq(collections::REVIEWS, "showId", &json!(show_id)).await?)
}

fn decode_reviews(docs: Vec<(DocPath, Value)>) -> Result<Vec<Review>> {
    docs.into_iter()
        .map(|(_, doc)| serde_json::from_value(doc).map_err(KeepUpError::from))
        .collect()
}

fn counter(doc: &Value, field: &str) -> u32 {
    doc.get(field)
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
