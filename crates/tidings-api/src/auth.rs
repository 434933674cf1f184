use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use tidings_db::Database;
use tidings_render::{Localization, PlaceholderRenderer, Reasons, RenderContext};
use tidings_types::api::Claims;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub reasons: Reasons,
    pub renderer: PlaceholderRenderer,
    pub localization: Localization,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>, localization: Localization) -> Self {
        Self {
            db,
            jwt_secret: jwt_secret.into(),
            reasons: Reasons::builtin(),
            renderer: PlaceholderRenderer,
            localization,
        }
    }

    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            reasons: &self.reasons,
            renderer: &self.renderer,
            localization: &self.localization,
        }
    }
}

/// Sign a token for `user_id` acting inside `organization_id`.
/// Tokens are minted by the service that owns accounts; this is its reference.
pub fn issue_token(secret: &str, user_id: Uuid, organization_id: Uuid) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        org: organization_id,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
