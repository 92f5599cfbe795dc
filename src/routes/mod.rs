pub mod auth;
pub mod health;
pub mod results;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/start", post(auth::start_session))
        .route("/auth/me", get(auth::get_current_player))
        .route("/grid", post(results::generate_grid))
        .route("/questions/count", get(results::question_count))
        .route("/save-results", post(results::save_results))
        .route("/results/{username}", get(results::get_results))
        .route("/results/{username}/submissions", get(results::get_submissions))
}
