pub mod bank;
pub mod session;

pub use bank::{QuestionBank, QuestionBankError};
pub use session::{Confirmation, PendingSaves, QuizError, QuizProgress, QuizSession};
