use sqlx::{types::Json, PgPool, Result};
use uuid::Uuid;

use crate::models::{AnswerRecord, QuizResult, QuizSubmission};

/// Store the latest progress of a player, replacing any previous row
pub async fn upsert_quiz_result(
    pool: &PgPool,
    username: &str,
    answers: &[AnswerRecord],
    score: i32,
) -> Result<QuizResult> {
    let result = sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO quiz_results (username, answers, score)
        VALUES ($1, $2, $3)
        ON CONFLICT (username)
        DO UPDATE SET
            answers = $2,
            score = $3,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(Json(answers))
    .bind(score)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Saved quiz result for {} (score {})", username, score);

    Ok(result)
}

pub async fn get_quiz_result(pool: &PgPool, username: &str) -> Result<Option<QuizResult>> {
    sqlx::query_as::<_, QuizResult>("SELECT * FROM quiz_results WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Append a saved set of results to the submission history
pub async fn insert_submission(
    pool: &PgPool,
    username: &str,
    answers: &[AnswerRecord],
    score: i32,
) -> Result<QuizSubmission> {
    sqlx::query_as::<_, QuizSubmission>(
        r#"
        INSERT INTO quiz_submissions (id, username, answers, score)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(Json(answers))
    .bind(score)
    .fetch_one(pool)
    .await
}

pub async fn list_submissions(pool: &PgPool, username: &str) -> Result<Vec<QuizSubmission>> {
    sqlx::query_as::<_, QuizSubmission>(
        r#"
        SELECT * FROM quiz_submissions
        WHERE username = $1
        ORDER BY submitted_at DESC
        "#,
    )
    .bind(username)
    .fetch_all(pool)
    .await
}
