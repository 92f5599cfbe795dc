use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub question: String,
    /// Candidate answers hidden in the grid
    pub words: Vec<String>,
    pub correct: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: String,
    pub answer: String,
    pub correct: bool,
}

/// Latest quiz progress of a player, one row per username
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub username: String,
    pub answers: Json<Vec<AnswerRecord>>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved set of results, appended on every save request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSubmission {
    pub id: Uuid,
    pub username: String,
    pub answers: Json<Vec<AnswerRecord>>,
    pub score: i32,
    pub submitted_at: DateTime<Utc>,
}
