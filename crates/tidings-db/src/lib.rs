pub mod cascade;
pub mod create;
pub mod directory;
pub mod error;
pub mod fanout;
pub mod filter;
pub mod migrations;
pub mod models;
pub mod reference;
pub mod retrieval;
pub mod toggle;

#[cfg(test)]
mod testutil;

use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use cascade::FeedOwner;
pub use create::CreateFeed;
pub use error::{ErrorKind, FeedError};
pub use fanout::{AccessMap, Grant};
pub use filter::{FeedFilter, SortDirection};
pub use reference::{Reference, ReferenceKind};
pub use retrieval::FeedPage;
pub use toggle::ToggleOutcome;

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

/// Timestamps are stored as UTC text so they order lexically.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run read-only work on the shared connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| FeedError::ConnectionUnavailable(e.to_string()))?;
        f(&conn)
    }

    /// Run `f` inside a transaction owned by this call.
    ///
    /// Commits when `f` succeeds. On error the transaction is dropped, which
    /// rolls back every write `f` made.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| FeedError::ConnectionUnavailable(e.to_string()))?;
        let tx = conn.transaction().map_err(FeedError::Transaction)?;
        let out = f(&tx)?;
        tx.commit().map_err(FeedError::Transaction)?;
        Ok(out)
    }
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `?1, ?2, ...` starting after `offset` bound parameters.
pub(crate) fn placeholders(offset: usize, count: usize) -> String {
    (offset + 1..=offset + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
