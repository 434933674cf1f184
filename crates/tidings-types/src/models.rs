use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
}

/// A resolved reference as attached to a retrieved feed entry.
/// Display fields are joined from the referenced object at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedRef {
    User {
        id: Uuid,
        username: String,
    },
    Group {
        id: Uuid,
        name: String,
    },
    Article {
        id: Uuid,
        /// Title of the latest revision, if the article has one.
        title: Option<String>,
    },
    ArticleRevision {
        id: Uuid,
        article_id: Uuid,
        title: String,
        commit: Option<String>,
    },
    ArticleList {
        id: Uuid,
        name: String,
    },
    KeyValue {
        key: String,
        value: String,
    },
}

/// One feed entry as seen by a specific user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub triggered_by_user: UserSummary,
    pub reason: String,
    pub public: bool,
    pub room_id: Option<String>,
    /// Read state of the viewer's grant. Entries without a grant count as read.
    pub read: bool,
    pub refs: Vec<FeedRef>,
    /// Rendered feed text, blank when the reason has no rendering.
    pub feed: String,
    /// Rendered notification text, falls back to `feed`.
    pub notification: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
