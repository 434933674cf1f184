use indexmap::IndexMap;
use indexmap::map::Entry;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::AccessRow;
use crate::{Database, FeedError, Result};

/// Per-user state written to `feed_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub user_id: Uuid,
    /// The user is owed a visible notification.
    pub notification: bool,
    pub read: bool,
}

/// Grants of one entry keyed by user, in first-insertion order.
///
/// The first write for a user wins, so a notify grant is never downgraded
/// by a later access grant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccessMap {
    grants: IndexMap<Uuid, Grant>,
}

impl AccessMap {
    /// Compute the grants for a new entry.
    ///
    /// `access` is only considered for non-public entries. When it is
    /// non-empty the triggering user is added to it so the creator can
    /// always see their own entry.
    pub fn build(triggered_by: Uuid, public: bool, notify: &[Uuid], access: &[Uuid]) -> Self {
        let mut map = Self::default();

        for &user_id in notify {
            map.insert_if_absent(Grant {
                user_id,
                notification: user_id != triggered_by,
                read: user_id == triggered_by,
            });
        }

        if !public && !access.is_empty() {
            for &user_id in access.iter().chain(std::iter::once(&triggered_by)) {
                map.insert_if_absent(Grant {
                    user_id,
                    notification: false,
                    read: true,
                });
            }
        }

        map
    }

    /// Returns `false` if the user already had a grant.
    pub fn insert_if_absent(&mut self, grant: Grant) -> bool {
        match self.grants.entry(grant.user_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(grant);
                true
            }
        }
    }

    pub fn get(&self, user_id: &Uuid) -> Option<&Grant> {
        self.grants.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.values()
    }

    /// Write every grant. Each user must be a member of `organization_id`.
    pub(crate) fn persist(&self, conn: &Connection, organization_id: Uuid, feed_id: Uuid) -> Result<()> {
        let mut member = conn.prepare(
            "SELECT 1 FROM organization_members WHERE organization_id = ?1 AND user_id = ?2",
        )?;
        let mut stmt = conn.prepare(
            "INSERT INTO feed_access (id, feed_id, user_id, notification, read) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        for grant in self.iter() {
            if !member.exists((organization_id.to_string(), grant.user_id.to_string()))? {
                return Err(FeedError::RecipientNotFound(grant.user_id));
            }
            stmt.execute(rusqlite::params![
                Uuid::new_v4().to_string(),
                feed_id.to_string(),
                grant.user_id.to_string(),
                grant.notification,
                grant.read,
            ])?;
        }

        Ok(())
    }
}

impl Database {
    /// Stored grants of one entry.
    pub fn access_rows(&self, feed_id: Uuid) -> Result<Vec<AccessRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, feed_id, user_id, notification, read FROM feed_access WHERE feed_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([feed_id.to_string()], |row| {
                    Ok(AccessRow {
                        id: row.get(0)?,
                        feed_id: row.get(1)?,
                        user_id: row.get(2)?,
                        notification: row.get(3)?,
                        read: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
