use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;

use crate::{models::Question, utils::letters::same_word};

/// Questions shipped with the server, used when no file is configured
const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.json");

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question {id} is invalid: {reason}")]
    Invalid { id: String, reason: String },

    #[error("question bank is empty")]
    Empty,
}

/// Ordered, validated list of quiz questions
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    /// Load questions from a JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuestionBankError> {
        let content = fs::read_to_string(path).await?;
        let bank = Self::from_json(&content)?;

        tracing::info!("Loaded {} questions into question bank", bank.len());

        Ok(bank)
    }

    pub fn builtin() -> Result<Self, QuestionBankError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn from_json(content: &str) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_str(content)?;
        Self::from_questions(questions)
    }

    pub fn from_questions(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }

        let mut seen_ids = HashSet::new();
        for question in &questions {
            Self::validate(question)?;
            if !seen_ids.insert(question.id.as_str()) {
                return Err(QuestionBankError::Invalid {
                    id: question.id.clone(),
                    reason: "duplicate question id".to_string(),
                });
            }
        }

        Ok(Self {
            questions: questions.into(),
        })
    }

    fn validate(question: &Question) -> Result<(), QuestionBankError> {
        let invalid = |reason: &str| QuestionBankError::Invalid {
            id: question.id.clone(),
            reason: reason.to_string(),
        };

        if question.words.is_empty() {
            return Err(invalid("no candidate words"));
        }
        if question.words.iter().any(|w| w.trim().is_empty()) {
            return Err(invalid("blank candidate word"));
        }
        if !question.words.iter().any(|w| same_word(w, &question.correct)) {
            return Err(invalid("correct answer is not among the candidate words"));
        }

        Ok(())
    }

    /// Shared handle to the questions, cheap to clone into each quiz session
    pub fn questions(&self) -> Arc<[Question]> {
        self.questions.clone()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, words: &[&str], correct: &str) -> Question {
        Question {
            id: id.to_string(),
            question: format!("Question {id}?"),
            words: words.iter().map(|w| w.to_string()).collect(),
            correct: correct.to_string(),
        }
    }

    #[test]
    fn test_builtin_bank_is_valid() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.len(), 6);
        assert!(bank.questions().iter().all(|q| q.words.len() == 4));
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert!(matches!(
            QuestionBank::from_questions(Vec::new()),
            Err(QuestionBankError::Empty)
        ));
    }

    #[test]
    fn test_correct_answer_must_be_a_candidate() {
        let result = QuestionBank::from_questions(vec![question("1", &["PARIS", "ROMA"], "LISBOA")]);
        assert!(matches!(result, Err(QuestionBankError::Invalid { id, .. }) if id == "1"));
    }

    #[test]
    fn test_correct_answer_matched_case_insensitively() {
        let bank = QuestionBank::from_questions(vec![question("1", &["Paris", "Roma"], "PARIS")]);
        assert!(bank.is_ok());
    }

    #[test]
    fn test_padded_answer_matches_its_word() {
        let bank = QuestionBank::from_questions(vec![question("1", &[" CAT ", "DOG"], "cat")]);
        assert!(bank.is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = QuestionBank::from_questions(vec![
            question("1", &["PARIS"], "PARIS"),
            question("1", &["ROMA"], "ROMA"),
        ]);
        assert!(matches!(result, Err(QuestionBankError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            QuestionBank::from_json("{not json"),
            Err(QuestionBankError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = tokio_test::block_on(QuestionBank::load("/nonexistent/questions.json"));
        assert!(matches!(result, Err(QuestionBankError::Io(_))));
    }
}
