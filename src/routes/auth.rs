use crate::{
    auth::{self, AuthenticatedPlayer},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    /// JWT used for the WebSocket and authenticated API calls
    pub access_token: String,
    pub session_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub session_id: Uuid,
    pub username: String,
}

/// Register a player name and hand out a token for a new quiz session
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, StatusCode> {
    let username = payload.username.trim();
    if username.is_empty() {
        tracing::debug!("Rejected quiz start with a blank username");
        return Err(StatusCode::BAD_REQUEST);
    }

    let session_id = Uuid::new_v4();
    let access_token =
        auth::generate_token(session_id, username, &state.config.security.jwt_secret).map_err(
            |e| {
                tracing::error!("Failed to generate JWT token: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            },
        )?;

    tracing::info!("Started quiz session {} for {}", session_id, username);

    Ok(Json(StartSessionResponse {
        access_token,
        session_id,
        username: username.to_string(),
    }))
}

/// Get the player behind the current token
pub async fn get_current_player(player: AuthenticatedPlayer) -> Json<PlayerResponse> {
    Json(PlayerResponse {
        session_id: player.session_id,
        username: player.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, test_support::test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    fn start_request(username: &str) -> Request<Body> {
        Request::post("/api/auth/start")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "username": username }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let app = build_router(test_state());
        let response = app.oneshot(start_request("   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_then_me() {
        let state = test_state();
        let response = build_router(state.clone())
            .oneshot(start_request(" ana "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let started: StartSessionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(started.username, "ana");

        let response = build_router(state)
            .oneshot(
                Request::get("/api/auth/me")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", started.access_token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let player: PlayerResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(player.session_id, started.session_id);
    }

    #[tokio::test]
    async fn test_me_without_token_unauthorized() {
        let response = build_router(test_state())
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
