use thiserror::Error;
use uuid::Uuid;

use crate::reference::ReferenceKind;

/// Broad failure classes. Callers use these to decide whether a retry of
/// the whole operation makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transaction,
    Storage,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("non-public feed entry needs at least one user to grant access to or notify")]
    NonPublicWithoutAccess,

    #[error("feed reason `{0}` does not exist")]
    ReasonNotFound(String),

    #[error("unknown reference type `{0}`")]
    UnknownReferenceType(String),

    #[error("reference of type `{kind}` is missing its {field}")]
    IncompleteReference { kind: &'static str, field: &'static str },

    #[error("referenced {kind} {id} not found")]
    ReferenceNotFound { kind: ReferenceKind, id: Uuid },

    #[error("user {0} to grant access to or notify is not a member of the organization")]
    RecipientNotFound(Uuid),

    #[error("notification not found")]
    GrantNotFound,

    #[error("transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("database connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPublicWithoutAccess
            | Self::ReasonNotFound(_)
            | Self::UnknownReferenceType(_)
            | Self::IncompleteReference { .. } => ErrorKind::Validation,
            Self::ReferenceNotFound { .. } | Self::RecipientNotFound(_) | Self::GrantNotFound => ErrorKind::NotFound,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::ConnectionUnavailable(_) | Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Only failures to begin or commit a transaction are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transaction
    }
}
