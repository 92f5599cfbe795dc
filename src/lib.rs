pub mod auth;
pub mod config;
pub mod db;
pub mod game;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod utils;
pub mod websocket;

use std::{sync::Arc, time::Instant};

use axum::{routing::get, Router};
use config::Config;
use dashmap::DashMap;
use quiz::QuestionBank;
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use uuid::Uuid;

/// A player currently connected over the WebSocket
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub username: String,
    pub started_at: Instant,
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub questions: QuestionBank,
    /// Connected quiz sessions keyed by session id
    pub active_sessions: DashMap<Uuid, ActiveSession>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new(&state.config.server.frontend_dir);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
