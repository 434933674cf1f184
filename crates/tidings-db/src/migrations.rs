use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (directory tables)");
        // Owned by the producers. The feed engine only checks existence
        // and joins display fields from these.
        conn.execute_batch(
            "
            CREATE TABLE organizations (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                default_language    TEXT NOT NULL DEFAULT 'en',
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                language    TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE organization_members (
                organization_id TEXT NOT NULL REFERENCES organizations(id),
                user_id         TEXT NOT NULL REFERENCES users(id),
                active          INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (organization_id, user_id)
            );

            CREATE TABLE user_groups (
                id              TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL REFERENCES organizations(id),
                name            TEXT NOT NULL
            );

            CREATE TABLE articles (
                id              TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL REFERENCES organizations(id),
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE article_contents (
                id              TEXT PRIMARY KEY,
                article_id      TEXT NOT NULL REFERENCES articles(id),
                title           TEXT NOT NULL,
                commit_message  TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_article_contents_article
                ON article_contents(article_id, created_at);

            CREATE TABLE article_lists (
                id              TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL REFERENCES organizations(id),
                name            TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (feed tables)");
        conn.execute_batch(
            "
            CREATE TABLE feeds (
                id                      TEXT PRIMARY KEY,
                organization_id         TEXT NOT NULL REFERENCES organizations(id),
                triggered_by_user_id    TEXT NOT NULL REFERENCES users(id),
                reason                  TEXT NOT NULL,
                public                  INTEGER NOT NULL DEFAULT 0,
                room_id                 TEXT,
                created_at              TEXT NOT NULL,
                updated_at              TEXT NOT NULL
            );

            CREATE INDEX idx_feeds_organization
                ON feeds(organization_id, created_at);

            CREATE TABLE feed_refs (
                id                  TEXT PRIMARY KEY,
                feed_id             TEXT NOT NULL REFERENCES feeds(id),
                ref_key             TEXT,
                ref_value           TEXT,
                user_id             TEXT REFERENCES users(id),
                user_group_id       TEXT REFERENCES user_groups(id),
                article_id          TEXT REFERENCES articles(id),
                article_content_id  TEXT REFERENCES article_contents(id),
                article_list_id     TEXT REFERENCES article_lists(id)
            );

            CREATE INDEX idx_feed_refs_feed ON feed_refs(feed_id);
            CREATE INDEX idx_feed_refs_article ON feed_refs(article_id);
            CREATE INDEX idx_feed_refs_article_content ON feed_refs(article_content_id);
            CREATE INDEX idx_feed_refs_article_list ON feed_refs(article_list_id);
            CREATE INDEX idx_feed_refs_user_group ON feed_refs(user_group_id);

            CREATE TABLE feed_access (
                id              TEXT PRIMARY KEY,
                feed_id         TEXT NOT NULL REFERENCES feeds(id),
                user_id         TEXT NOT NULL REFERENCES users(id),
                notification    INTEGER NOT NULL DEFAULT 0,
                read            INTEGER NOT NULL DEFAULT 1,
                UNIQUE(feed_id, user_id)
            );

            CREATE INDEX idx_feed_access_user ON feed_access(user_id, notification, read);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
