use crate::{
    db,
    game::{GeneratedGrid, GridGenerator},
    models::{AnswerRecord, QuizResult, QuizSubmission},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound on words hidden in a single requested grid
const MAX_GRID_WORDS: usize = 12;

#[derive(Debug, Deserialize)]
pub struct GridRequest {
    pub words: Vec<String>,
    /// Seed for a reproducible grid
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SaveResultsRequest {
    pub username: String,
    pub answers: Vec<AnswerRecord>,
    pub score: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResultsResponse {
    pub message: String,
    pub submission_id: Uuid,
}

/// Build a word soup for an arbitrary word list
pub async fn generate_grid(
    Json(payload): Json<GridRequest>,
) -> Result<Json<GeneratedGrid>, StatusCode> {
    if payload.words.is_empty() || payload.words.len() > MAX_GRID_WORDS {
        return Err(StatusCode::BAD_REQUEST);
    }

    let generated = match payload.seed {
        Some(seed) => {
            GridGenerator::generate_with_rng(&payload.words, &mut ChaCha8Rng::seed_from_u64(seed))
        }
        None => GridGenerator::generate(&payload.words),
    };

    Ok(Json(generated))
}

pub async fn question_count(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "count": state.questions.len() }))
}

/// Store a finished set of answers
pub async fn save_results(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveResultsRequest>,
) -> Result<Json<SaveResultsResponse>, StatusCode> {
    let username = payload.username.trim();
    if username.is_empty() || payload.score < 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let submission =
        db::queries::insert_submission(&state.db, username, &payload.answers, payload.score)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save results for {}: {}", username, e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

    tracing::info!("Saved results for {} (score {})", username, payload.score);

    Ok(Json(SaveResultsResponse {
        message: "Results saved successfully".to_string(),
        submission_id: submission.id,
    }))
}

/// Latest progress of a player
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<QuizResult>, StatusCode> {
    db::queries::get_quiz_result(&state.db, &username)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load results for {}: {}", username, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_submissions(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<QuizSubmission>>, StatusCode> {
    db::queries::list_submissions(&state.db, &username)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to load submissions for {}: {}", username, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
