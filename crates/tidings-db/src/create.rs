use rusqlite::Transaction;
use tidings_render::ReasonCatalogue;
use tidings_types::api::CreateFeedRequest;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::fanout::AccessMap;
use crate::reference::{self, Reference};
use crate::{Database, FeedError, Result, now_timestamp};

/// Everything needed to record one activity.
/// `access` and `notify` hold user ids.
#[derive(Debug, Clone)]
pub struct CreateFeed {
    pub organization_id: Uuid,
    pub triggered_by: Uuid,
    pub reason: String,
    pub public: bool,
    pub access: Vec<Uuid>,
    pub notify: Vec<Uuid>,
    pub refs: Vec<Reference>,
}

impl CreateFeed {
    pub fn new(organization_id: Uuid, triggered_by: Uuid, reason: impl Into<String>) -> Self {
        Self {
            organization_id,
            triggered_by,
            reason: reason.into(),
            public: false,
            access: Vec::new(),
            notify: Vec::new(),
            refs: Vec::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn notify(mut self, users: impl IntoIterator<Item = Uuid>) -> Self {
        self.notify.extend(users);
        self
    }

    pub fn access(mut self, users: impl IntoIterator<Item = Uuid>) -> Self {
        self.access.extend(users);
        self
    }

    pub fn reference(mut self, reference: Reference) -> Self {
        self.refs.push(reference);
        self
    }

    /// Build from an API request. Fails on unknown reference types.
    pub fn from_request(organization_id: Uuid, triggered_by: Uuid, req: CreateFeedRequest) -> Result<Self> {
        let refs = req
            .refs
            .into_iter()
            .map(Reference::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            organization_id,
            triggered_by,
            reason: req.reason,
            public: req.public,
            access: req.access,
            notify: req.notify,
            refs,
        })
    }

    fn validate(&self, reasons: &dyn ReasonCatalogue) -> Result<()> {
        if !self.public && self.access.is_empty() && self.notify.is_empty() {
            return Err(FeedError::NonPublicWithoutAccess);
        }

        if !reasons.reason_exists(&self.reason) {
            return Err(FeedError::ReasonNotFound(self.reason.clone()));
        }

        Ok(())
    }
}

/// Create an entry with its references and grants inside the caller's
/// transaction. Never commits or rolls back `tx`.
pub fn create_feed(tx: &Transaction<'_>, reasons: &dyn ReasonCatalogue, data: &CreateFeed) -> Result<Uuid> {
    data.validate(reasons)?;

    let resolved = reference::resolve(tx, data.organization_id, &data.refs)?;
    let feed_id = Uuid::new_v4();
    let now = now_timestamp();

    tx.execute(
        "INSERT INTO feeds (id, organization_id, triggered_by_user_id, reason, public, room_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        rusqlite::params![
            feed_id.to_string(),
            data.organization_id.to_string(),
            data.triggered_by.to_string(),
            data.reason,
            data.public,
            resolved.room_id,
            now,
        ],
    )?;

    reference::insert_refs(tx, feed_id, &resolved.rows)?;

    let grants = AccessMap::build(data.triggered_by, data.public, &data.notify, &data.access);
    grants.persist(tx, data.organization_id, feed_id)?;

    debug!(
        %feed_id,
        reason = %data.reason,
        public = data.public,
        refs = resolved.rows.len(),
        grants = grants.len(),
        "feed entry created"
    );
    Ok(feed_id)
}

impl Database {
    /// Create an entry in a transaction of its own. Nothing is persisted on failure.
    pub fn create_feed(&self, reasons: &dyn ReasonCatalogue, data: &CreateFeed) -> Result<Uuid> {
        self.with_tx(|tx| create_feed(tx, reasons, data))
            .inspect_err(|e| warn!(reason = %data.reason, "feed entry not created: {}", e))
    }
}
