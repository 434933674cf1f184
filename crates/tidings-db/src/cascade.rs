use rusqlite::Transaction;
use tracing::debug;
use uuid::Uuid;

use crate::reference::ReferenceKind;
use crate::{Result, placeholders};

/// The object whose deletion takes its feed entries with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOwner {
    Article(Uuid),
    ArticleRevision(Uuid),
    ArticleList(Uuid),
    Group(Uuid),
}

impl FeedOwner {
    fn parts(self) -> (ReferenceKind, Uuid) {
        match self {
            Self::Article(id) => (ReferenceKind::Article, id),
            Self::ArticleRevision(id) => (ReferenceKind::ArticleRevision, id),
            Self::ArticleList(id) => (ReferenceKind::ArticleList, id),
            Self::Group(id) => (ReferenceKind::Group, id),
        }
    }
}

/// Delete every entry of `organization_id` that references `owner`, together
/// with all grants and references of those entries. Returns the number of
/// removed entries.
///
/// Runs as one step of the caller's deletion transaction and never commits
/// or rolls back on its own.
pub fn delete_feeds(tx: &Transaction<'_>, organization_id: Uuid, owner: FeedOwner) -> Result<usize> {
    let feed_ids = feed_ids_referencing(tx, organization_id, owner)?;
    if feed_ids.is_empty() {
        return Ok(0);
    }

    // Grants and references first so an interrupted cascade leaves no orphans.
    let marks = placeholders(0, feed_ids.len());
    let params = rusqlite::params_from_iter(feed_ids.iter());
    let grants = tx.execute(&format!("DELETE FROM feed_access WHERE feed_id IN ({})", marks), params)?;

    let params = rusqlite::params_from_iter(feed_ids.iter());
    let refs = tx.execute(&format!("DELETE FROM feed_refs WHERE feed_id IN ({})", marks), params)?;

    let params = rusqlite::params_from_iter(feed_ids.iter());
    let entries = tx.execute(&format!("DELETE FROM feeds WHERE id IN ({})", marks), params)?;

    debug!(%organization_id, ?owner, entries, refs, grants, "feed entries removed");
    Ok(entries)
}

fn feed_ids_referencing(tx: &Transaction<'_>, organization_id: Uuid, owner: FeedOwner) -> Result<Vec<String>> {
    let (kind, id) = owner.parts();
    let sql = format!(
        "SELECT DISTINCT r.feed_id FROM feed_refs r
         JOIN feeds f ON f.id = r.feed_id
         WHERE r.{} = ?1 AND f.organization_id = ?2",
        kind.column()
    );

    let mut stmt = tx.prepare(&sql)?;
    let ids = stmt
        .query_map((id.to_string(), organization_id.to_string()), |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(ids)
}
