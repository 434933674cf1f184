use rusqlite::{OptionalExtension, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::{Database, FeedError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A single notification was flipped to this read state.
    Toggled { read: bool },
    /// Bulk mode: this many unread notifications were marked as read.
    MarkedAllRead { rows: usize },
}

/// Flip the read flag of the user's notification for `feed_id`, or mark all
/// of the user's notifications in the organization as read when `feed_id`
/// is `None`.
pub fn toggle_notification_read(
    tx: &Transaction<'_>,
    organization_id: Uuid,
    user_id: Uuid,
    feed_id: Option<Uuid>,
) -> Result<ToggleOutcome> {
    let org = organization_id.to_string();
    let user = user_id.to_string();

    let Some(feed_id) = feed_id else {
        let rows = tx.execute(
            "UPDATE feed_access SET read = 1
             WHERE user_id = ?2 AND notification = 1 AND read = 0
             AND feed_id IN (SELECT id FROM feeds WHERE organization_id = ?1)",
            (&org, &user),
        )?;
        debug!(%user_id, rows, "notifications marked as read");
        return Ok(ToggleOutcome::MarkedAllRead { rows });
    };

    let (grant_id, read): (String, bool) = tx
        .query_row(
            "SELECT a.id, a.read FROM feed_access a
             JOIN feeds f ON f.id = a.feed_id
             WHERE f.organization_id = ?1 AND a.user_id = ?2 AND f.id = ?3 AND a.notification = 1",
            (&org, &user, feed_id.to_string()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or(FeedError::GrantNotFound)?;

    tx.execute("UPDATE feed_access SET read = ?2 WHERE id = ?1", (&grant_id, !read))?;
    Ok(ToggleOutcome::Toggled { read: !read })
}

impl Database {
    pub fn toggle_notification_read(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        feed_id: Option<Uuid>,
    ) -> Result<ToggleOutcome> {
        self.with_tx(|tx| toggle_notification_read(tx, organization_id, user_id, feed_id))
    }
}
