use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FeedEntry;

// -- JWT Claims --

/// Bearer token claims. Every request is scoped to one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub org: Uuid,
    pub exp: usize,
}

// -- Create --

/// Untyped reference as sent by producers. `kind` is validated when the
/// request is converted into a creation command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawReference {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFeedRequest {
    pub reason: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub access: Vec<Uuid>,
    #[serde(default)]
    pub notify: Vec<Uuid>,
    #[serde(default)]
    pub refs: Vec<RawReference>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFeedResponse {
    pub id: Uuid,
}

// -- Read state --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReadRequest {
    /// Toggle a single notification. Omit to mark everything as read.
    #[serde(default)]
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleReadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked: Option<usize>,
}

// -- Retrieval --

/// Query string of `GET /feed`. `reason` and `user` may repeat.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub notifications: bool,
    #[serde(default)]
    pub unread: bool,
    #[serde(default, rename = "reason")]
    pub reasons: Vec<String>,
    #[serde(default, rename = "user")]
    pub users: Vec<Uuid>,
    pub created_start: Option<DateTime<Utc>>,
    pub created_end: Option<DateTime<Utc>>,
    pub updated_start: Option<DateTime<Utc>>,
    pub updated_end: Option<DateTime<Utc>>,
    pub sort_created: Option<String>,
    pub sort_updated: Option<String>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedPageResponse {
    pub feed: Vec<FeedEntry>,
    /// Unread notifications of the caller. Only counted for notification queries.
    pub count: usize,
}

// -- Cascade --

/// Owning object whose feed state is removed. Exactly one field must be set.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteFeedQuery {
    pub article: Option<Uuid>,
    pub article_revision: Option<Uuid>,
    pub article_list: Option<Uuid>,
    pub group: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFeedResponse {
    pub deleted: usize,
}
