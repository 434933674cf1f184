use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Value;
use tidings_types::api::FeedQuery;
use uuid::Uuid;

use crate::{TIMESTAMP_FORMAT, placeholders};

/// Page size used when none is given, and the largest page ever returned.
pub const MAX_LIMIT: u32 = 20;
/// Smallest page size for notification queries, also their default.
pub const NOTIFICATIONS_MIN_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts `asc`/`desc` in any case. Anything else means "no sorting".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Narrows down the entries a user sees. The default filter returns the
/// newest visible entries.
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Only entries the user holds a notification for.
    pub notifications: bool,
    /// Only entries with an unread notification. Ignored unless
    /// `notifications` is set.
    pub unread: bool,
    /// Allow-list of reason codes.
    pub reasons: Vec<String>,
    /// Allow-list of triggering users.
    pub users: Vec<Uuid>,
    pub created_start: Option<DateTime<Utc>>,
    /// Inclusive: entries created on the end day still match.
    pub created_end: Option<DateTime<Utc>>,
    pub updated_start: Option<DateTime<Utc>>,
    pub updated_end: Option<DateTime<Utc>>,
    pub sort_created: Option<SortDirection>,
    pub sort_updated: Option<SortDirection>,
    pub offset: u32,
    /// 0 means the default page size: 20, or 5 for notification queries.
    pub limit: u32,
}

impl FeedFilter {
    pub fn notifications() -> Self {
        Self {
            notifications: true,
            ..Self::default()
        }
    }

    pub fn from_query(query: FeedQuery) -> Self {
        Self {
            notifications: query.notifications,
            unread: query.unread,
            reasons: query.reasons,
            users: query.users,
            created_start: query.created_start,
            created_end: query.created_end,
            updated_start: query.updated_start,
            updated_end: query.updated_end,
            sort_created: query.sort_created.as_deref().and_then(SortDirection::parse),
            sort_updated: query.sort_updated.as_deref().and_then(SortDirection::parse),
            offset: query.offset,
            limit: query.limit,
        }
    }

    pub fn effective_limit(&self) -> u32 {
        if self.notifications {
            self.limit.clamp(NOTIFICATIONS_MIN_LIMIT, MAX_LIMIT)
        } else if self.limit == 0 {
            MAX_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        }
    }

    /// Build the page query. Parameters `?1` and `?2` are the organization
    /// and the viewing user.
    pub(crate) fn to_sql(&self, organization_id: Uuid, user_id: Uuid) -> (String, Vec<Value>) {
        let mut sql = String::from(
            "SELECT f.id, f.organization_id, f.triggered_by_user_id, u.username, f.reason, f.public,
                    f.room_id, COALESCE(a.read, 1), f.created_at, f.updated_at
             FROM feeds f
             JOIN users u ON u.id = f.triggered_by_user_id
             LEFT JOIN feed_access a ON a.feed_id = f.id AND a.user_id = ?2
             WHERE f.organization_id = ?1
             AND (f.public = 1 OR a.id IS NOT NULL)",
        );
        let mut params = vec![
            Value::Text(organization_id.to_string()),
            Value::Text(user_id.to_string()),
        ];

        if self.notifications {
            sql.push_str(" AND a.notification = 1");
            if self.unread {
                sql.push_str(" AND a.read = 0");
            }
        }

        if !self.users.is_empty() {
            let marks = placeholders(params.len(), self.users.len());
            sql.push_str(&format!(" AND f.triggered_by_user_id IN ({})", marks));
            params.extend(self.users.iter().map(|id| Value::Text(id.to_string())));
        }

        if !self.reasons.is_empty() {
            let marks = placeholders(params.len(), self.reasons.len());
            sql.push_str(&format!(" AND f.reason IN ({})", marks));
            params.extend(self.reasons.iter().cloned().map(Value::Text));
        }

        let ranges = [
            ("f.created_at >", self.created_start),
            ("f.created_at <", self.created_end.map(|end| end + Duration::days(1))),
            ("f.updated_at >", self.updated_start),
            ("f.updated_at <", self.updated_end.map(|end| end + Duration::days(1))),
        ];
        for (condition, bound) in ranges {
            if let Some(bound) = bound {
                params.push(Value::Text(bound.format(TIMESTAMP_FORMAT).to_string()));
                sql.push_str(&format!(" AND {} ?{}", condition, params.len()));
            }
        }

        let mut order = Vec::new();
        if let Some(dir) = self.sort_created {
            order.push(("f.created_at", dir));
        }
        if let Some(dir) = self.sort_updated {
            order.push(("f.updated_at", dir));
        }
        if order.is_empty() {
            order.push(("f.created_at", SortDirection::Desc));
        }
        // rowid breaks ties between entries created within the same instant.
        order.push(("f.rowid", order[0].1));

        let order: Vec<String> = order
            .into_iter()
            .map(|(column, dir)| format!("{} {}", column, dir.sql()))
            .collect();
        sql.push_str(&format!(" ORDER BY {}", order.join(", ")));

        params.push(Value::Integer(i64::from(self.effective_limit())));
        params.push(Value::Integer(i64::from(self.offset)));
        sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", params.len() - 1, params.len()));

        (sql, params)
    }
}
