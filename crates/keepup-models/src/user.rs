use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Profile document kept for every account under `users/<uid>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn for_identity(identity: &UserIdentity, now: DateTime<Utc>) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    pub id: String,
    pub user_id: Option<String>, // Reports may be filed while signed out
    pub title: String,
    pub description: String,
    pub device_info: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}
