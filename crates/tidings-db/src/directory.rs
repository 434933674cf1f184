//! Minimal directory of the objects feed entries point at.
//!
//! Organizations, users, groups, articles and lists are owned by other
//! services. Only what the feed engine needs is kept here: rows to check
//! references against, display fields, and deletions that take the
//! dependent feed state with them.

use anyhow::Result;
use rusqlite::Transaction;
use tracing::info;
use uuid::Uuid;

use crate::cascade::{FeedOwner, delete_feeds};
use crate::toggle::{ToggleOutcome, toggle_notification_read};
use crate::{Database, now_timestamp};

impl Database {
    // -- Organizations & users --

    pub fn create_organization(&self, name: &str, default_language: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO organizations (id, name, default_language) VALUES (?1, ?2, ?3)",
                (id.to_string(), name, default_language),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    pub fn create_user(&self, username: &str, language: Option<&str>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, language) VALUES (?1, ?2, ?3)",
                (id.to_string(), username, language),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Add or reactivate a membership.
    ///
    /// Notifications from before the (re)join are marked as read in the same
    /// transaction so they do not resurface.
    pub fn join_organization(&self, organization_id: Uuid, user_id: Uuid) -> Result<ToggleOutcome> {
        let outcome = self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO organization_members (organization_id, user_id, active) VALUES (?1, ?2, 1)
                 ON CONFLICT (organization_id, user_id) DO UPDATE SET active = 1",
                (organization_id.to_string(), user_id.to_string()),
            )?;
            toggle_notification_read(tx, organization_id, user_id, None)
        })?;

        info!(%organization_id, %user_id, "user joined organization");
        Ok(outcome)
    }

    pub fn leave_organization(&self, organization_id: Uuid, user_id: Uuid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE organization_members SET active = 0 WHERE organization_id = ?1 AND user_id = ?2",
                (organization_id.to_string(), user_id.to_string()),
            )?;
            Ok(())
        })?;
        Ok(())
    }

    // -- Groups, articles, lists --

    pub fn create_group(&self, organization_id: Uuid, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_groups (id, organization_id, name) VALUES (?1, ?2, ?3)",
                (id.to_string(), organization_id.to_string(), name),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    pub fn create_article(&self, organization_id: Uuid) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO articles (id, organization_id) VALUES (?1, ?2)",
                (id.to_string(), organization_id.to_string()),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Store a new revision. The newest revision provides the article's title.
    pub fn create_article_revision(&self, article_id: Uuid, title: &str, commit: Option<&str>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO article_contents (id, article_id, title, commit_message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id.to_string(), article_id.to_string(), title, commit, now_timestamp()),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    pub fn create_article_list(&self, organization_id: Uuid, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO article_lists (id, organization_id, name) VALUES (?1, ?2, ?3)",
                (id.to_string(), organization_id.to_string(), name),
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    // -- Deletion --
    // Each removes the object only if it belongs to `organization_id` and
    // returns the number of feed entries removed along with it.

    /// Delete an article with all of its revisions.
    pub fn delete_article(&self, organization_id: Uuid, article_id: Uuid) -> Result<usize> {
        let removed = self.with_tx(|tx| {
            let revisions: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT c.id FROM article_contents c
                     JOIN articles a ON a.id = c.article_id
                     WHERE c.article_id = ?1 AND a.organization_id = ?2",
                )?;
                stmt.query_map((article_id.to_string(), organization_id.to_string()), |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?
            };

            let mut removed = delete_feeds(tx, organization_id, FeedOwner::Article(article_id))?;
            for revision in &revisions {
                let Ok(revision) = revision.parse() else { continue };
                removed += delete_feeds(tx, organization_id, FeedOwner::ArticleRevision(revision))?;
                tx.execute("DELETE FROM article_contents WHERE id = ?1", [revision.to_string()])?;
            }

            tx.execute(
                "DELETE FROM articles WHERE id = ?1 AND organization_id = ?2",
                (article_id.to_string(), organization_id.to_string()),
            )?;
            Ok(removed)
        })?;

        info!(%organization_id, %article_id, removed, "article deleted");
        Ok(removed)
    }

    pub fn delete_article_revision(&self, organization_id: Uuid, revision_id: Uuid) -> Result<usize> {
        Ok(self.with_tx(|tx| {
            delete_owned(
                tx,
                organization_id,
                FeedOwner::ArticleRevision(revision_id),
                "DELETE FROM article_contents WHERE id = ?1
                 AND article_id IN (SELECT id FROM articles WHERE organization_id = ?2)",
            )
        })?)
    }

    pub fn delete_article_list(&self, organization_id: Uuid, list_id: Uuid) -> Result<usize> {
        Ok(self.with_tx(|tx| {
            delete_owned(
                tx,
                organization_id,
                FeedOwner::ArticleList(list_id),
                "DELETE FROM article_lists WHERE id = ?1 AND organization_id = ?2",
            )
        })?)
    }

    pub fn delete_group(&self, organization_id: Uuid, group_id: Uuid) -> Result<usize> {
        Ok(self.with_tx(|tx| {
            delete_owned(
                tx,
                organization_id,
                FeedOwner::Group(group_id),
                "DELETE FROM user_groups WHERE id = ?1 AND organization_id = ?2",
            )
        })?)
    }
}

fn delete_owned(tx: &Transaction<'_>, organization_id: Uuid, owner: FeedOwner, delete_sql: &str) -> crate::Result<usize> {
    let id = match owner {
        FeedOwner::Article(id)
        | FeedOwner::ArticleRevision(id)
        | FeedOwner::ArticleList(id)
        | FeedOwner::Group(id) => id,
    };

    let removed = delete_feeds(tx, organization_id, owner)?;
    tx.execute(delete_sql, (id.to_string(), organization_id.to_string()))?;
    info!(%organization_id, ?owner, removed, "object deleted");
    Ok(removed)
}
