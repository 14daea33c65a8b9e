//! assessa-core — Quiz assessment engine.
//!
//! This crate defines the quiz data model, the answer store, the scoring
//! function, the countdown timer, and the session state machine that ties
//! them together.

pub mod answer;
pub mod attempt;
pub mod error;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod traits;

pub use answer::{Answer, AnswerStore};
pub use attempt::{AttemptContext, QuizAttempt};
pub use error::QuizError;
pub use model::{Question, QuestionKind, QuestionType, Quiz};
pub use session::{QuizSession, SessionStatus, TickOutcome};
