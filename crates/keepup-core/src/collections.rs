//! Document paths used by the app.

use crate::error::{KeepUpError, Result};
use crate::store::DocPath;

pub const USERS: &str = "users";
pub const REVIEWS: &str = "reviews";
pub const REVIEW_SUMMARIES: &str = "reviewSummaries";
pub const BUG_REPORTS: &str = "bugReports";

const VOTES: &str = "votes";
const TRACKED: &str = "tracked";
const TRACKED_SHOWS_DOC: &str = "shows";
const WATCH_PROGRESS: &str = "watchProgress";

/// Reject ids that would not stay a single path segment
pub fn check_id(kind: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(KeepUpError::InvalidInput(format!("{} id must not be empty", kind)));
    }
    if id.contains('/') {
        return Err(KeepUpError::InvalidInput(format!("{} id must not contain '/': {}", kind, id)));
    }
    Ok(())
}

pub fn user(user_id: &str) -> DocPath {
    DocPath::from_segments(&[USERS, user_id])
}

pub fn tracked_shows(user_id: &str) -> DocPath {
    DocPath::from_segments(&[USERS, user_id, TRACKED, TRACKED_SHOWS_DOC])
}

pub fn watch_progress(user_id: &str, show_id: &str) -> DocPath {
    DocPath::from_segments(&[USERS, user_id, WATCH_PROGRESS, show_id])
}

pub fn watch_progress_collection(user_id: &str) -> String {
    format!("{}/{}/{}", USERS, user_id, WATCH_PROGRESS)
}

pub fn review(review_id: &str) -> DocPath {
    DocPath::from_segments(&[REVIEWS, review_id])
}

pub fn review_vote(review_id: &str, user_id: &str) -> DocPath {
    DocPath::from_segments(&[REVIEWS, review_id, VOTES, user_id])
}

pub fn review_votes_collection(review_id: &str) -> String {
    format!("{}/{}/{}", REVIEWS, review_id, VOTES)
}

pub fn review_summary(show_id: &str) -> DocPath {
    DocPath::from_segments(&[REVIEW_SUMMARIES, show_id])
}

pub fn bug_report(report_id: &str) -> DocPath {
    DocPath::from_segments(&[BUG_REPORTS, report_id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(review_vote("r1", "u1").as_str(), "reviews/r1/votes/u1");
        assert_eq!(review_vote("r1", "u1").collection(), review_votes_collection("r1"));
        assert_eq!(watch_progress("u1", "42").as_str(), "users/u1/watchProgress/42");
        assert_eq!(watch_progress("u1", "42").collection(), watch_progress_collection("u1"));
        assert_eq!(tracked_shows("u1").as_str(), "users/u1/tracked/shows");
    }

    #[test]
    fn test_check_id() {
        assert!(check_id("review", "0b5e-41").is_ok());
        assert!(matches!(check_id("review", "r1/votes/bob"), Err(KeepUpError::InvalidInput(_))));
        assert!(matches!(check_id("show", " "), Err(KeepUpError::InvalidInput(_))));
    }
}
