//! Database row types. These map directly to SQLite rows and stay
//! separate from the tidings-types API models.

pub struct FeedRow {
    pub id: String,
    pub organization_id: String,
    pub triggered_by_user_id: String,
    pub triggered_by_username: String,
    pub reason: String,
    pub public: bool,
    pub room_id: Option<String>,
    pub read: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One `feed_refs` row joined with the display fields of whatever it points at.
pub struct FeedRefRow {
    pub feed_id: String,
    pub ref_key: Option<String>,
    pub ref_value: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub user_group_id: Option<String>,
    pub group_name: Option<String>,
    pub article_id: Option<String>,
    pub article_title: Option<String>,
    pub article_content_id: Option<String>,
    pub content_article_id: Option<String>,
    pub content_title: Option<String>,
    pub content_commit: Option<String>,
    pub article_list_id: Option<String>,
    pub list_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRow {
    pub id: String,
    pub feed_id: String,
    pub user_id: String,
    pub notification: bool,
    pub read: bool,
}
