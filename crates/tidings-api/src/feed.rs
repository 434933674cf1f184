use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::Query;
use tracing::info;

use tidings_db::cascade::delete_feeds;
use tidings_db::{CreateFeed, FeedFilter, FeedOwner, ToggleOutcome};
use tidings_types::api::{
    Claims, CreateFeedRequest, CreateFeedResponse, DeleteFeedQuery, DeleteFeedResponse, FeedPageResponse, FeedQuery,
    ToggleReadRequest, ToggleReadResponse,
};

use crate::auth::AppState;
use crate::error::ApiError;

/// `GET /feed`: one page of the caller's feed in their organization.
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = FeedFilter::from_query(query);

    let app = state.clone();
    let page = tokio::task::spawn_blocking(move || {
        app.db
            .get_filtered_feed(claims.org, claims.sub, Some(filter), app.render_context())
    })
    .await??;

    Ok(Json(FeedPageResponse {
        feed: page.entries,
        count: page.unread_count,
    }))
}

/// `PUT /feed`: flip one notification, or mark all as read when no id is sent.
pub async fn toggle_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ToggleReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        app.db.toggle_notification_read(claims.org, claims.sub, req.id)
    })
    .await??;

    let response = match outcome {
        ToggleOutcome::Toggled { read } => ToggleReadResponse { read: Some(read), marked: None },
        ToggleOutcome::MarkedAllRead { rows } => ToggleReadResponse { read: None, marked: Some(rows) },
    };
    Ok(Json(response))
}

/// `POST /feed`: record an activity triggered by the caller.
pub async fn create_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateFeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let data = CreateFeed::from_request(claims.org, claims.sub, req)?;

    let app = state.clone();
    let id = tokio::task::spawn_blocking(move || app.db.create_feed(&app.reasons, &data)).await??;

    Ok((StatusCode::CREATED, Json(CreateFeedResponse { id })))
}

/// `DELETE /feed`: drop the feed state of an object that is being deleted.
/// Only entries of the caller's organization are touched.
pub async fn delete_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DeleteFeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = owner_from_query(query)?;

    let organization_id = claims.org;

    let app = state.clone();
    let deleted =
        tokio::task::spawn_blocking(move || app.db.with_tx(|tx| delete_feeds(tx, organization_id, owner))).await??;

    info!(?owner, deleted, organization = %organization_id, user = %claims.sub, "feed state of owner removed");
    Ok(Json(DeleteFeedResponse { deleted }))
}

fn owner_from_query(query: DeleteFeedQuery) -> Result<FeedOwner, ApiError> {
    let owners: Vec<FeedOwner> = [
        query.article.map(FeedOwner::Article),
        query.article_revision.map(FeedOwner::ArticleRevision),
        query.article_list.map(FeedOwner::ArticleList),
        query.group.map(FeedOwner::Group),
    ]
    .into_iter()
    .flatten()
    .collect();

    match owners.as_slice() {
        [owner] => Ok(*owner),
        _ => Err(ApiError::InvalidOwner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn exactly_one_owner_is_accepted() {
        let id = Uuid::new_v4();

        let query = DeleteFeedQuery { article_list: Some(id), ..DeleteFeedQuery::default() };
        assert_eq!(owner_from_query(query).unwrap(), FeedOwner::ArticleList(id));

        assert!(matches!(owner_from_query(DeleteFeedQuery::default()), Err(ApiError::InvalidOwner)));

        let both = DeleteFeedQuery {
            article: Some(id),
            group: Some(id),
            ..DeleteFeedQuery::default()
        };
        assert!(matches!(owner_from_query(both), Err(ApiError::InvalidOwner)));
    }
}
