pub mod answer;
pub mod grid;
pub mod quiz;

pub use answer::{AnswerOutcome, Notification, NotificationKind};
pub use grid::{Grid, Orientation, Position, GRID_SIZE};
pub use quiz::{AnswerRecord, Question, QuizResult, QuizSubmission};
