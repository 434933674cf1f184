use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tidings_render::{RenderContext, TextKind};
use tidings_types::models::{FeedEntry, FeedRef, OrganizationSummary, UserSummary};
use tracing::warn;
use uuid::Uuid;

use crate::filter::FeedFilter;
use crate::models::{FeedRefRow, FeedRow};
use crate::{Database, Result, TIMESTAMP_FORMAT, placeholders};

/// One page of a user's feed.
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    /// Unread notifications of the user in the organization.
    /// Only counted for notification queries, 0 otherwise.
    pub unread_count: usize,
}

/// Fetch the entries `user_id` may see in `organization_id`, with
/// references attached and texts rendered in the user's language.
pub fn get_filtered_feed(
    conn: &Connection,
    organization_id: Uuid,
    user_id: Uuid,
    filter: Option<FeedFilter>,
    ctx: RenderContext<'_>,
) -> Result<FeedPage> {
    let filter = filter.unwrap_or_default();

    let unread_count = if filter.notifications {
        count_unread_notifications(conn, organization_id, user_id)?
    } else {
        0
    };

    let rows = query_feed_rows(conn, &filter, organization_id, user_id)?;
    let feed_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut refs = query_refs(conn, &feed_ids)?;

    let (organization, org_language, user_language) = query_language_context(conn, organization_id, user_id)?;
    let language = ctx
        .localization
        .resolve(user_language.as_deref(), org_language.as_deref());

    let entries = rows
        .into_iter()
        .map(|row| {
            let refs = refs.remove(&row.id).unwrap_or_default();
            let mut entry = to_entry(row, refs);
            render_texts(ctx, &organization, language, &mut entry);
            entry
        })
        .collect();

    Ok(FeedPage { entries, unread_count })
}

impl Database {
    pub fn get_filtered_feed(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        filter: Option<FeedFilter>,
        ctx: RenderContext<'_>,
    ) -> Result<FeedPage> {
        self.with_conn(|conn| get_filtered_feed(conn, organization_id, user_id, filter, ctx))
    }
}

fn count_unread_notifications(conn: &Connection, organization_id: Uuid, user_id: Uuid) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM feed_access a
         JOIN feeds f ON f.id = a.feed_id
         WHERE f.organization_id = ?1 AND a.user_id = ?2 AND a.notification = 1 AND a.read = 0",
        (organization_id.to_string(), user_id.to_string()),
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn query_feed_rows(conn: &Connection, filter: &FeedFilter, organization_id: Uuid, user_id: Uuid) -> Result<Vec<FeedRow>> {
    let (sql, params) = filter.to_sql(organization_id, user_id);
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(FeedRow {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                triggered_by_user_id: row.get(2)?,
                triggered_by_username: row.get(3)?,
                reason: row.get(4)?,
                public: row.get(5)?,
                room_id: row.get(6)?,
                read: row.get(7)?,
                created_at: row.get(8)?,
                updated_at: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Batch-fetch references for a set of entries, grouped by entry id.
fn query_refs(conn: &Connection, feed_ids: &[String]) -> Result<HashMap<String, Vec<FeedRef>>> {
    if feed_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT r.feed_id, r.ref_key, r.ref_value,
                r.user_id, u.username,
                r.user_group_id, g.name,
                r.article_id,
                (SELECT c.title FROM article_contents c WHERE c.article_id = r.article_id
                 ORDER BY c.created_at DESC, c.rowid DESC LIMIT 1),
                r.article_content_id, ac.article_id, ac.title, ac.commit_message,
                r.article_list_id, l.name
         FROM feed_refs r
         LEFT JOIN users u ON u.id = r.user_id
         LEFT JOIN user_groups g ON g.id = r.user_group_id
         LEFT JOIN article_contents ac ON ac.id = r.article_content_id
         LEFT JOIN article_lists l ON l.id = r.article_list_id
         WHERE r.feed_id IN ({})
         ORDER BY r.rowid",
        placeholders(0, feed_ids.len())
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(feed_ids.iter()), |row| {
            Ok(FeedRefRow {
                feed_id: row.get(0)?,
                ref_key: row.get(1)?,
                ref_value: row.get(2)?,
                user_id: row.get(3)?,
                username: row.get(4)?,
                user_group_id: row.get(5)?,
                group_name: row.get(6)?,
                article_id: row.get(7)?,
                article_title: row.get(8)?,
                article_content_id: row.get(9)?,
                content_article_id: row.get(10)?,
                content_title: row.get(11)?,
                content_commit: row.get(12)?,
                article_list_id: row.get(13)?,
                list_name: row.get(14)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut grouped: HashMap<String, Vec<FeedRef>> = HashMap::new();
    for row in rows {
        let feed_id = row.feed_id.clone();
        if let Some(feed_ref) = to_feed_ref(row) {
            grouped.entry(feed_id).or_default().push(feed_ref);
        }
    }

    Ok(grouped)
}

fn query_language_context(
    conn: &Connection,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<(OrganizationSummary, Option<String>, Option<String>)> {
    let found = conn
        .query_row(
            "SELECT o.name, o.default_language, (SELECT language FROM users WHERE id = ?2)
             FROM organizations o WHERE o.id = ?1",
            (organization_id.to_string(), user_id.to_string()),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    let (name, org_language, user_language) = found.unwrap_or_default();
    Ok((
        OrganizationSummary {
            id: organization_id,
            name,
        },
        org_language,
        user_language,
    ))
}

fn render_texts(ctx: RenderContext<'_>, organization: &OrganizationSummary, language: &str, entry: &mut FeedEntry) {
    let Some(templates) = ctx.reasons.templates(language, &entry.reason) else {
        return;
    };

    let feed = ctx
        .renderer
        .render(organization, templates.feed, TextKind::Feed, entry, language)
        .unwrap_or_default();

    let notification = match templates.notification {
        Some(template) => ctx
            .renderer
            .render(organization, template, TextKind::Notification, entry, language)
            .unwrap_or_default(),
        None => feed.clone(),
    };

    entry.feed = feed;
    entry.notification = notification;
}

fn to_entry(row: FeedRow, refs: Vec<FeedRef>) -> FeedEntry {
    FeedEntry {
        id: parse_id(&row.id, "feed id", &row.id),
        organization_id: parse_id(&row.organization_id, "organization_id", &row.id),
        triggered_by_user: UserSummary {
            id: parse_id(&row.triggered_by_user_id, "triggered_by_user_id", &row.id),
            username: row.triggered_by_username,
        },
        reason: row.reason,
        public: row.public,
        room_id: row.room_id,
        read: row.read,
        refs,
        feed: String::new(),
        notification: String::new(),
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
    }
}

fn to_feed_ref(row: FeedRefRow) -> Option<FeedRef> {
    let feed_id = row.feed_id.as_str();

    if let Some(id) = row.user_id {
        return Some(FeedRef::User {
            id: parse_id(&id, "user_id", feed_id),
            username: row.username.unwrap_or_default(),
        });
    }
    if let Some(id) = row.user_group_id {
        return Some(FeedRef::Group {
            id: parse_id(&id, "user_group_id", feed_id),
            name: row.group_name.unwrap_or_default(),
        });
    }
    if let Some(id) = row.article_id {
        return Some(FeedRef::Article {
            id: parse_id(&id, "article_id", feed_id),
            title: row.article_title,
        });
    }
    if let Some(id) = row.article_content_id {
        return Some(FeedRef::ArticleRevision {
            id: parse_id(&id, "article_content_id", feed_id),
            article_id: parse_id(row.content_article_id.as_deref().unwrap_or_default(), "article_id", feed_id),
            title: row.content_title.unwrap_or_default(),
            commit: row.content_commit,
        });
    }
    if let Some(id) = row.article_list_id {
        return Some(FeedRef::ArticleList {
            id: parse_id(&id, "article_list_id", feed_id),
            name: row.list_name.unwrap_or_default(),
        });
    }
    if let (Some(key), Some(value)) = (row.ref_key, row.ref_value) {
        return Some(FeedRef::KeyValue { key, value });
    }

    warn!("Feed reference without target on entry '{}'", feed_id);
    None
}

fn parse_id(value: &str, field: &str, feed_id: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on feed entry '{}': {}", field, value, feed_id, e);
        Uuid::default()
    })
}

fn parse_timestamp(value: &str, feed_id: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on feed entry '{}': {}", value, feed_id, e);
            DateTime::default()
        })
}
