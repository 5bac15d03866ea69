use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest and highest star rating a review may carry
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReviewTag {
    Amazing,
    Good,
    Okay,
    Disappointing,
    Terrible,
    Funny,
    Emotional,
    Thrilling,
    Boring,
}

impl ReviewTag {
    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewTag::Amazing => "Amazing",
            ReviewTag::Good => "Good",
            ReviewTag::Okay => "Okay",
            ReviewTag::Disappointing => "Disappointing",
            ReviewTag::Terrible => "Terrible",
            ReviewTag::Funny => "Funny",
            ReviewTag::Emotional => "Emotional",
            ReviewTag::Thrilling => "Thrilling",
            ReviewTag::Boring => "Boring",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub show_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: f64, // 0.0-5.0 inclusive
    pub text: String,
    #[serde(default)]
    pub tags: Vec<ReviewTag>,
    #[serde(default)]
    pub is_spoiler: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(default)]
    pub not_helpful_count: u32,
    /// The reading user's own vote; filled in from the vote record, never stored on the review
    #[serde(skip)]
    pub user_voted_helpful: Option<bool>,
}

impl Review {
    pub fn new(
        show_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        rating: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            show_id: show_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            rating,
            text: text.into(),
            tags: Vec::new(),
            is_spoiler: false,
            created_at: Utc::now(),
            helpful_count: 0,
            not_helpful_count: 0,
            user_voted_helpful: None,
        }
    }

    pub fn has_valid_rating(&self) -> bool {
        self.rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Aggregate over every review of a show.
///
/// `rating_distribution` maps the truncated star value (0-5) to the number of
/// reviews in that bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub show_id: String,
    pub average_rating: f64,
    pub total_reviews: u32,
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u32>,
}

/// A single user's helpful/not-helpful judgment on a review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub is_helpful: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteCounts {
    pub helpful: u32,
    pub not_helpful: u32,
}

/// Ratings and averages are kept as f64; anything shown to a user is rounded to one decimal.
pub fn format_rating(value: f64) -> String {
    format!("{:.1}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut review = Review::new("1", "u1", "Ann", 5.0, "great");
        assert!(review.has_valid_rating());
        review.rating = 0.0;
        assert!(review.has_valid_rating());
        review.rating = 5.5;
        assert!(!review.has_valid_rating());
        review.rating = f64::NAN;
        assert!(!review.has_valid_rating());
    }

    #[test]
    fn test_own_vote_is_not_serialized() {
        let mut review = Review::new("1", "u1", "Ann", 4.0, "good");
        review.user_voted_helpful = Some(true);
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("userVotedHelpful").is_none());
        assert_eq!(json["helpfulCount"], 0);
    }

    #[test]
    fn test_summary_distribution_round_trips_integer_keys() {
        let mut distribution = BTreeMap::new();
        distribution.insert(5u8, 2u32);
        distribution.insert(3u8, 1u32);
        let summary = ReviewSummary {
            show_id: "1".to_string(),
            average_rating: 4.25,
            total_reviews: 3,
            rating_distribution: distribution,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: ReviewSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(4.26), "4.3");
        assert_eq!(format_rating(3.0), "3.0");
    }
}
