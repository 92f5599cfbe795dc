use serde::{Deserialize, Serialize};

use crate::models::{AnswerRecord, Grid, NotificationKind, Position};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ToggleCell {
        position: Position,
    },
    ClearSelection,
    ConfirmSelection,
    RestartQuiz,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    QuestionState {
        question_id: String,
        question: String,
        number: usize,
        total: usize,
        grid: Grid,
        score: u32,
    },
    SelectionUpdated {
        selection: Vec<Position>,
        spelled_word: String,
    },
    Notification {
        id: u64,
        message: String,
        kind: NotificationKind,
        expires_in_ms: u64,
    },
    NotificationDismissed {
        id: u64,
    },
    AnswerRecorded {
        record: AnswerRecord,
        score: u32,
        answered: usize,
        total: usize,
    },
    Saving {
        in_flight: bool,
    },
    QuizFinished {
        username: String,
        score: u32,
        total: usize,
        answers: Vec<AnswerRecord>,
    },
    Error {
        message: String,
    },
}
