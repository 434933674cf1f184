pub mod auth;
pub mod error;
pub mod feed;
pub mod middleware;

use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// All feed routes. Every route requires a bearer token.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/feed",
            get(feed::get_feed)
                .put(feed::toggle_read)
                .post(feed::create_feed)
                .delete(feed::delete_feed),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use tidings_db::Database;
    use tidings_render::Localization;

    use super::*;
    use crate::auth::{AppStateInner, issue_token};

    const SECRET: &str = "test-secret";

    struct Harness {
        app: Router,
        state: AppState,
        org: Uuid,
        alice: Uuid,
        bob: Uuid,
    }

    impl Harness {
        fn new() -> Self {
            let db = Database::open_in_memory().unwrap();
            let org = db.create_organization("Acme", "en").unwrap();
            let alice = db.create_user("alice", None).unwrap();
            let bob = db.create_user("bob", None).unwrap();
            db.join_organization(org, alice).unwrap();
            db.join_organization(org, bob).unwrap();

            let state: AppState = Arc::new(AppStateInner::new(db, SECRET, Localization::default()));
            Self { app: routes(state.clone()), state, org, alice, bob }
        }

        async fn send(&self, user: Uuid, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            self.send_in(self.org, user, method, uri, body).await
        }

        async fn send_in(
            &self,
            org: Uuid,
            user: Uuid,
            method: Method,
            uri: &str,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let token = issue_token(SECRET, user, org).unwrap();
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token));
            let req = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let res = self.app.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    }

    #[tokio::test]
    async fn requests_without_a_valid_token_are_rejected() {
        let h = Harness::new();

        let req = Request::builder().uri("/feed").body(Body::empty()).unwrap();
        let res = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let forged = issue_token("other-secret", h.alice, h.org).unwrap();
        let req = Request::builder()
            .uri("/feed")
            .header(header::AUTHORIZATION, format!("Bearer {}", forged))
            .body(Body::empty())
            .unwrap();
        let res = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn created_notification_shows_up_for_the_recipient() {
        let h = Harness::new();
        let group = h.state.db.create_group(h.org, "Ops").unwrap();

        let (status, created) = h
            .send(
                h.alice,
                Method::POST,
                "/feed",
                Some(json!({
                    "reason": "add_user_group_member",
                    "notify": [h.bob],
                    "refs": [
                        { "type": "user", "id": h.bob },
                        { "type": "group", "id": group },
                    ],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, page) = h.send(h.bob, Method::GET, "/feed?notifications=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["count"], 1);
        assert_eq!(page["feed"][0]["id"], created["id"]);
        assert_eq!(page["feed"][0]["notification"], "alice added you to group Ops.");
        assert_eq!(page["feed"][0]["read"], false);

        // Notify-only entry: the creator holds no grant for it.
        let (_, alice) = h.send(h.alice, Method::GET, "/feed", None).await;
        assert!(alice["feed"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_reason_keys_filter_the_page() {
        let h = Harness::new();
        for reason in ["joined_organization", "left_organization", "mentioned"] {
            let (status, _) = h
                .send(h.alice, Method::POST, "/feed", Some(json!({ "reason": reason, "public": true })))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = h
            .send(h.bob, Method::GET, "/feed?reason=joined_organization&reason=left_organization", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["feed"].as_array().unwrap().len(), 2);
        assert_eq!(page["count"], 0);
    }

    #[tokio::test]
    async fn validation_and_lookup_errors_map_to_status_codes() {
        let h = Harness::new();

        let (status, _) = h.send(h.alice, Method::POST, "/feed", Some(json!({ "reason": "mentioned" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = h
            .send(h.alice, Method::POST, "/feed", Some(json!({ "reason": "no_such_reason", "public": true })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = h
            .send(
                h.alice,
                Method::POST,
                "/feed",
                Some(json!({ "reason": "mentioned", "public": true, "refs": [{ "type": "tag", "id": Uuid::new_v4() }] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = h
            .send(
                h.alice,
                Method::POST,
                "/feed",
                Some(json!({ "reason": "create_user_group", "public": true, "refs": [{ "type": "group", "id": Uuid::new_v4() }] })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h
            .send(h.alice, Method::POST, "/feed", Some(json!({ "reason": "mentioned", "notify": [Uuid::new_v4()] })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = h
            .send(h.bob, Method::PUT, "/feed", Some(json!({ "id": Uuid::new_v4() })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn toggle_then_mark_all_read() {
        let h = Harness::new();
        let mut ids = Vec::new();
        for _ in 0..2 {
            let (_, created) = h
                .send(h.alice, Method::POST, "/feed", Some(json!({ "reason": "mentioned", "notify": [h.bob] })))
                .await;
            ids.push(created["id"].clone());
        }

        let (status, toggled) = h.send(h.bob, Method::PUT, "/feed", Some(json!({ "id": ids[0] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled, json!({ "read": true }));

        let (_, marked) = h.send(h.bob, Method::PUT, "/feed", Some(json!({}))).await;
        assert_eq!(marked, json!({ "marked": 1 }));

        let (_, page) = h.send(h.bob, Method::GET, "/feed?notifications=true&unread=true", None).await;
        assert_eq!(page["count"], 0);
        assert!(page["feed"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_needs_exactly_one_owner() {
        let h = Harness::new();
        let group = h.state.db.create_group(h.org, "Ops").unwrap();
        h.send(
            h.alice,
            Method::POST,
            "/feed",
            Some(json!({ "reason": "create_user_group", "public": true, "refs": [{ "type": "group", "id": group }] })),
        )
        .await;

        let (status, _) = h.send(h.alice, Method::DELETE, "/feed", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/feed?group={}&article={}", group, Uuid::new_v4());
        let (status, _) = h.send(h.alice, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, deleted) = h.send(h.alice, Method::DELETE, &format!("/feed?group={}", group), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "deleted": 1 }));

        let (_, page) = h.send(h.bob, Method::GET, "/feed", None).await;
        assert!(page["feed"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_cannot_reach_another_organization() {
        let h = Harness::new();
        let group = h.state.db.create_group(h.org, "Ops").unwrap();
        let (status, _) = h
            .send(
                h.alice,
                Method::POST,
                "/feed",
                Some(json!({ "reason": "create_user_group", "public": true, "refs": [{ "type": "group", "id": group }] })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let other = h.state.db.create_organization("Other", "en").unwrap();
        let mallory = h.state.db.create_user("mallory", None).unwrap();
        h.state.db.join_organization(other, mallory).unwrap();

        let uri = format!("/feed?group={}", group);
        let (status, deleted) = h.send_in(other, mallory, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "deleted": 0 }));

        let (_, page) = h.send(h.bob, Method::GET, "/feed", None).await;
        assert_eq!(page["feed"].as_array().unwrap().len(), 1);
    }
}
