use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{
    game::{GeneratedGrid, GridGenerator, SelectionEngine},
    models::{AnswerOutcome, AnswerRecord, Notification, Position, Question},
};

/// Grids generated per question before settling for one missing some words
pub const MAX_GRID_ATTEMPTS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("the quiz is already finished")]
    Finished,

    #[error("position ({}, {}) is outside the grid", .0.row, .0.col)]
    OutOfBounds(Position),

    #[error("select at least one letter before confirming")]
    EmptySelection,
}

/// Snapshot of a player's run, handed to persistence
#[derive(Debug, Clone)]
pub struct QuizProgress {
    pub username: String,
    pub answers: Arc<[AnswerRecord]>,
    pub score: u32,
    pub total: usize,
    pub finished: bool,
}

/// Count of progress snapshots handed to persistence and not yet written.
///
/// The count is raised before a snapshot is queued and lowered once it is
/// written, so it stays above zero while any save is queued or running.
#[derive(Debug, Clone, Default)]
pub struct PendingSaves(Arc<AtomicUsize>);

impl PendingSaves {
    /// Record a queued save; returns true if nothing was pending before
    pub fn begin(&self) -> bool {
        self.0.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Record a finished save; returns true if nothing is pending anymore
    pub fn finish(&self) -> bool {
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .unwrap_or(0);
        previous <= 1
    }

    pub fn is_saving(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }
}

#[derive(Debug, Clone)]
pub enum Confirmation {
    /// The selection was not a connected path; nothing was recorded
    Rejected { notification: Notification },
    /// An answer was recorded and the quiz moved on
    Answered {
        outcome: AnswerOutcome,
        record: AnswerRecord,
        notification: Notification,
        progress: QuizProgress,
    },
}

#[derive(Debug)]
struct ActiveQuestion {
    question: Question,
    engine: SelectionEngine,
}

/// One player's pass through the question bank.
///
/// Owns the grid and selection engine of the current question. Answers are
/// kept as an immutable history that is rebuilt on every answer, so a
/// snapshot handed out earlier never changes.
#[derive(Debug)]
pub struct QuizSession {
    username: String,
    questions: Arc<[Question]>,
    current_index: usize,
    current: Option<ActiveQuestion>,
    answers: Arc<[AnswerRecord]>,
    score: u32,
    rng: ChaCha8Rng,
    notification_ttl: Duration,
    saving: PendingSaves,
}

impl QuizSession {
    pub fn new(
        username: impl Into<String>,
        questions: Arc<[Question]>,
        rng: ChaCha8Rng,
        notification_ttl: Duration,
    ) -> Self {
        let mut session = Self {
            username: username.into(),
            questions,
            current_index: 0,
            current: None,
            answers: Arc::from(Vec::new()),
            score: 0,
            rng,
            notification_ttl,
            saving: PendingSaves::default(),
        };
        session.start_question();
        session
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref().map(|active| &active.question)
    }

    pub fn engine(&self) -> Option<&SelectionEngine> {
        self.current.as_ref().map(|active| &active.engine)
    }

    /// 1-based number of the question being played
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answers(&self) -> Arc<[AnswerRecord]> {
        self.answers.clone()
    }

    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            username: self.username.clone(),
            answers: self.answers.clone(),
            score: self.score,
            total: self.questions.len(),
            finished: self.is_finished(),
        }
    }

    /// Save counter shared with the persistence task
    pub fn pending_saves(&self) -> PendingSaves {
        self.saving.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_saving()
    }

    pub fn toggle(&mut self, pos: Position) -> Result<(), QuizError> {
        let active = self.current.as_mut().ok_or(QuizError::Finished)?;
        if !active.engine.toggle(pos) {
            return Err(QuizError::OutOfBounds(pos));
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), QuizError> {
        let active = self.current.as_mut().ok_or(QuizError::Finished)?;
        active.engine.clear();
        Ok(())
    }

    /// Confirm the current selection.
    ///
    /// Wrong answers are recorded and advance the quiz just like right ones;
    /// only a disconnected selection keeps the player on the same question.
    pub fn confirm(&mut self) -> Result<Confirmation, QuizError> {
        let active = self.current.as_mut().ok_or(QuizError::Finished)?;
        if active.engine.current_selection().is_empty() {
            return Err(QuizError::EmptySelection);
        }

        let outcome = active.engine.confirm();
        let notification = active
            .engine
            .last_notification()
            .cloned()
            .unwrap_or_else(|| Notification::error("Letters must be connected!"));

        let Some(outcome) = outcome else {
            return Ok(Confirmation::Rejected { notification });
        };

        let record = AnswerRecord {
            question_id: active.question.id.clone(),
            answer: outcome.word.clone(),
            correct: outcome.correct,
        };

        self.answers = self
            .answers
            .iter()
            .cloned()
            .chain(std::iter::once(record.clone()))
            .collect();
        if record.correct {
            self.score += 1;
        }

        tracing::info!(
            "Player {} answered question {} with {} ({})",
            self.username,
            record.question_id,
            record.answer,
            if record.correct { "correct" } else { "incorrect" }
        );

        self.current_index += 1;
        self.start_question();

        Ok(Confirmation::Answered {
            outcome,
            record,
            notification,
            progress: self.progress(),
        })
    }

    /// Start over from the first question with an empty history
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.answers = Arc::from(Vec::new());
        self.score = 0;
        self.start_question();
    }

    fn start_question(&mut self) {
        let Some(question) = self.questions.get(self.current_index).cloned() else {
            tracing::info!(
                "Player {} finished the quiz with {}/{}",
                self.username,
                self.score,
                self.questions.len()
            );
            self.current = None;
            return;
        };

        let generated = self.generate_grid(&question);
        let engine = SelectionEngine::new(generated.grid, question.correct.clone())
            .with_notification_ttl(self.notification_ttl);

        self.current = Some(ActiveQuestion { question, engine });
    }

    /// Generate a grid for the question, retrying while words are left out.
    /// Falls back to the attempt that placed the correct answer and the most words.
    fn generate_grid(&mut self, question: &Question) -> GeneratedGrid {
        let mut best: Option<GeneratedGrid> = None;

        for attempt in 1..=MAX_GRID_ATTEMPTS {
            let generated = GridGenerator::generate_with_rng(&question.words, &mut self.rng);
            if generated.unplaced.is_empty() {
                return generated;
            }

            tracing::debug!(
                "Grid attempt {} for question {} left out {:?}",
                attempt,
                question.id,
                generated.unplaced
            );

            let rank = |g: &GeneratedGrid| (g.is_placed(&question.correct), g.placements.len());
            if best.as_ref().map_or(true, |b| rank(&generated) > rank(b)) {
                best = Some(generated);
            }
        }

        let best = best.unwrap_or_else(|| {
            GridGenerator::generate_with_rng(&question.words, &mut self.rng)
        });
        tracing::warn!(
            "Question {} is missing words {:?} after {} grids",
            question.id,
            best.unplaced,
            MAX_GRID_ATTEMPTS
        );
        best
    }
}
