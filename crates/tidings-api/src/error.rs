use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use tidings_db::{ErrorKind, FeedError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("exactly one of article, article_revision, article_list or group must be given")]
    InvalidOwner,

    #[error("spawn_blocking join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Feed(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Transaction => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidOwner => StatusCode::BAD_REQUEST,
            Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!("{}", self);
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
