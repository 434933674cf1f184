use std::fmt;

use rusqlite::{Connection, OptionalExtension};
use tidings_types::api::RawReference;
use uuid::Uuid;

use crate::{FeedError, Result};

/// Kinds of domain objects a feed entry can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    User,
    Group,
    Article,
    ArticleRevision,
    ArticleList,
}

impl ReferenceKind {
    /// Column in `feed_refs` holding the id for this kind.
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Group => "user_group_id",
            Self::Article => "article_id",
            Self::ArticleRevision => "article_content_id",
            Self::ArticleList => "article_list_id",
        }
    }

    fn exists_sql(self) -> &'static str {
        match self {
            Self::User => "SELECT 1 FROM organization_members WHERE user_id = ?1 AND organization_id = ?2",
            Self::Group => "SELECT 1 FROM user_groups WHERE id = ?1 AND organization_id = ?2",
            Self::Article => "SELECT 1 FROM articles WHERE id = ?1 AND organization_id = ?2",
            Self::ArticleRevision => {
                "SELECT 1 FROM article_contents c
                 JOIN articles a ON a.id = c.article_id
                 WHERE c.id = ?1 AND a.organization_id = ?2"
            }
            Self::ArticleList => "SELECT 1 FROM article_lists WHERE id = ?1 AND organization_id = ?2",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Article => "article",
            Self::ArticleRevision => "article revision",
            Self::ArticleList => "article list",
        })
    }
}

/// A value a producer attaches to a new feed entry.
///
/// Object references carry an optional id; `None` stands for an optional
/// reference the producer did not have and is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    User(Option<Uuid>),
    Group(Option<Uuid>),
    Article(Option<Uuid>),
    ArticleRevision(Option<Uuid>),
    ArticleList(Option<Uuid>),
    /// Free-form data for the feed text, stored as its own reference row.
    KeyValue { key: String, value: String },
    /// Ties the entry to an object that has no id yet. Stored on the entry itself.
    Room(String),
}

impl Reference {
    pub fn key_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl TryFrom<RawReference> for Reference {
    type Error = FeedError;

    fn try_from(raw: RawReference) -> Result<Self> {
        let reference = match raw.kind.as_str() {
            "user" => Self::User(raw.id),
            "group" => Self::Group(raw.id),
            "article" => Self::Article(raw.id),
            "article_revision" => Self::ArticleRevision(raw.id),
            "article_list" => Self::ArticleList(raw.id),
            "key_value" => Self::KeyValue {
                key: raw.key.unwrap_or_default(),
                value: raw.value.unwrap_or_default(),
            },
            "room" => Self::Room(raw.room.ok_or(FeedError::IncompleteReference {
                kind: "room",
                field: "room",
            })?),
            other => return Err(FeedError::UnknownReferenceType(other.to_string())),
        };
        Ok(reference)
    }
}

/// A reference that becomes a `feed_refs` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefRow {
    Object { kind: ReferenceKind, id: Uuid },
    KeyValue { key: String, value: String },
}

#[derive(Debug, Default)]
pub(crate) struct Resolved {
    pub rows: Vec<RefRow>,
    pub room_id: Option<String>,
}

/// Validate and normalize references for a new entry in `organization_id`.
/// Every referenced object must exist.
pub(crate) fn resolve(conn: &Connection, organization_id: Uuid, refs: &[Reference]) -> Result<Resolved> {
    let mut resolved = Resolved::default();

    for reference in refs {
        let (kind, id) = match reference {
            Reference::User(id) => (ReferenceKind::User, id),
            Reference::Group(id) => (ReferenceKind::Group, id),
            Reference::Article(id) => (ReferenceKind::Article, id),
            Reference::ArticleRevision(id) => (ReferenceKind::ArticleRevision, id),
            Reference::ArticleList(id) => (ReferenceKind::ArticleList, id),
            Reference::KeyValue { key, value } => {
                let (key, value) = (key.trim(), value.trim());
                if !key.is_empty() && !value.is_empty() {
                    resolved.rows.push(RefRow::KeyValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                continue;
            }
            Reference::Room(room) => {
                resolved.room_id = Some(room.clone());
                continue;
            }
        };

        let Some(id) = *id else { continue };
        ensure_exists(conn, organization_id, kind, id)?;
        resolved.rows.push(RefRow::Object { kind, id });
    }

    Ok(resolved)
}

fn ensure_exists(conn: &Connection, organization_id: Uuid, kind: ReferenceKind, id: Uuid) -> Result<()> {
    let found = conn
        .query_row(
            kind.exists_sql(),
            (id.to_string(), organization_id.to_string()),
            |_| Ok(()),
        )
        .optional()?;

    found.ok_or(FeedError::ReferenceNotFound { kind, id })
}

pub(crate) fn insert_refs(conn: &Connection, feed_id: Uuid, rows: &[RefRow]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO feed_refs (id, feed_id, ref_key, ref_value, user_id, user_group_id, article_id, article_content_id, article_list_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    for row in rows {
        let mut objects: [Option<String>; 5] = Default::default();
        let (key, value) = match row {
            RefRow::Object { kind, id } => {
                let slot = match kind {
                    ReferenceKind::User => 0,
                    ReferenceKind::Group => 1,
                    ReferenceKind::Article => 2,
                    ReferenceKind::ArticleRevision => 3,
                    ReferenceKind::ArticleList => 4,
                };
                objects[slot] = Some(id.to_string());
                (None, None)
            }
            RefRow::KeyValue { key, value } => (Some(key.as_str()), Some(value.as_str())),
        };

        let [user, group, article, revision, list] = objects;
        stmt.execute(rusqlite::params![
            Uuid::new_v4().to_string(),
            feed_id.to_string(),
            key,
            value,
            user,
            group,
            article,
            revision,
            list,
        ])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;

    #[test]
    fn skips_absent_handles_and_blank_pairs() {
        let fx = Fixture::new();
        let refs = vec![
            Reference::User(None),
            Reference::Article(None),
            Reference::key_value("  ", "value"),
            Reference::key_value("key", "   "),
            Reference::key_value("  name ", " Roadmap  "),
        ];

        let resolved = fx.db.with_conn(|conn| resolve(conn, fx.org, &refs)).unwrap();
        assert_eq!(
            resolved.rows,
            vec![RefRow::KeyValue { key: "name".into(), value: "Roadmap".into() }]
        );
        assert!(resolved.room_id.is_none());
    }

    #[test]
    fn room_is_set_on_the_entry_not_as_a_row() {
        let fx = Fixture::new();
        let refs = vec![Reference::Room("draft-42".into())];

        let resolved = fx.db.with_conn(|conn| resolve(conn, fx.org, &refs)).unwrap();
        assert!(resolved.rows.is_empty());
        assert_eq!(resolved.room_id.as_deref(), Some("draft-42"));
    }

    #[test]
    fn missing_object_is_not_found() {
        let fx = Fixture::new();
        let ghost = Uuid::new_v4();
        let refs = vec![Reference::User(Some(fx.alice)), Reference::ArticleList(Some(ghost))];

        let err = fx.db.with_conn(|conn| resolve(conn, fx.org, &refs)).unwrap_err();
        assert!(matches!(
            err,
            FeedError::ReferenceNotFound { kind: ReferenceKind::ArticleList, id } if id == ghost
        ));
    }

    #[test]
    fn objects_of_another_organization_are_not_found() {
        let fx = Fixture::new();
        let other = fx.db.create_organization("Other", "en").unwrap();
        let group = fx.db.create_group(other, "Elsewhere").unwrap();

        let err = fx
            .db
            .with_conn(|conn| resolve(conn, fx.org, &[Reference::Group(Some(group))]))
            .unwrap_err();
        assert!(matches!(err, FeedError::ReferenceNotFound { kind: ReferenceKind::Group, .. }));
    }

    #[test]
    fn raw_references_are_typed() {
        let raw = |kind: &str| RawReference {
            kind: kind.into(),
            id: None,
            key: None,
            value: None,
            room: None,
        };

        assert_eq!(Reference::try_from(raw("article_list")).unwrap(), Reference::ArticleList(None));
        assert!(matches!(
            Reference::try_from(raw("tag")),
            Err(FeedError::UnknownReferenceType(kind)) if kind == "tag"
        ));
        assert!(matches!(
            Reference::try_from(raw("room")),
            Err(FeedError::IncompleteReference { .. })
        ));
    }
}
