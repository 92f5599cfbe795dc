use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;

/// Hours a quiz token stays valid
const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Session ID
    pub username: String, // Name typed by the player
    pub exp: usize,       // Expiration time
}

#[derive(Debug, Clone)]
pub struct AuthenticatedPlayer {
    pub session_id: Uuid,
    pub username: String,
}

/// Extractor for players from JWT tokens
impl<S> FromRequestParts<S> for AuthenticatedPlayer
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Try to extract token from Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
            // Browsers can't set headers on WebSocket upgrades, so accept ?token=
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| {
                        serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok()
                    })
                    .and_then(|params| {
                        params
                            .into_iter()
                            .find(|(k, _)| k == "token")
                            .map(|(_, v)| v)
                    })
            });

        async move {
            let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
            verify_token(&token, &app_state.config.security.jwt_secret)
                .map_err(|_| StatusCode::UNAUTHORIZED)
        }
    }
}

/// Generate a JWT token for a quiz session
pub fn generate_token(
    session_id: Uuid,
    username: &str,
    jwt_secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration =
        (chrono::Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp();

    let claims = Claims {
        sub: session_id.to_string(),
        username: username.to_string(),
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
}

/// Decode a token back into the player it was issued for
pub fn verify_token(token: &str, jwt_secret: &str) -> anyhow::Result<AuthenticatedPlayer> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )?;

    let session_id = token_data.claims.sub.parse::<Uuid>()?;

    Ok(AuthenticatedPlayer {
        session_id,
        username: token_data.claims.username,
    })
}
