use std::collections::HashMap;

use uuid::Uuid;

use crate::Database;

/// In-memory database with one organization and four members.
pub struct Fixture {
    pub db: Database,
    pub org: Uuid,
    pub alice: Uuid,
    pub bob: Uuid,
    pub carol: Uuid,
    pub dave: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let org = db.create_organization("Acme", "en").unwrap();

        let member = |name: &str| {
            let id = db.create_user(name, None).unwrap();
            db.join_organization(org, id).unwrap();
            id
        };
        let (alice, bob, carol, dave) = (member("alice"), member("bob"), member("carol"), member("dave"));

        Self { db, org, alice, bob, carol, dave }
    }

    /// Rows in `feeds`, `feed_refs` and `feed_access`.
    pub fn row_counts(&self) -> (usize, usize, usize) {
        self.db
            .with_conn(|conn| {
                let count = |table: &str| -> crate::Result<usize> {
                    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
                    Ok(n as usize)
                };
                Ok((count("feeds")?, count("feed_refs")?, count("feed_access")?))
            })
            .unwrap()
    }

    /// `(notification, read)` per user for one entry.
    pub fn grants(&self, feed_id: Uuid) -> HashMap<Uuid, (bool, bool)> {
        self.db
            .access_rows(feed_id)
            .unwrap()
            .into_iter()
            .map(|row| (row.user_id.parse().unwrap(), (row.notification, row.read)))
            .collect()
    }
}
