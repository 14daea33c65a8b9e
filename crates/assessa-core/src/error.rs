//! Session error types.
//!
//! Only conditions the caller must act on are errors. Mutating calls made in
//! a status that forbids them are silent no-ops, and answer-shape problems are
//! advisory [`ValidationWarning`](crate::parser::ValidationWarning)s.

use thiserror::Error;

/// Errors returned by [`QuizSession`](crate::session::QuizSession).
#[derive(Debug, Error)]
pub enum QuizError {
    /// The quiz cannot be attempted as configured (e.g. it has no questions).
    #[error("quiz '{quiz_id}' cannot be started: {reason}")]
    Configuration { quiz_id: String, reason: String },

    /// The attempt store failed to record the attempt. The session keeps its
    /// answers and elapsed time and `submit()` may be called again.
    #[error("failed to record attempt {attempt_id}: {message}")]
    Submission { attempt_id: String, message: String },

    /// `submit()` was called on a session that was never started.
    #[error("no quiz in progress")]
    NotStarted,
}

impl QuizError {
    /// Returns `true` if re-issuing `submit()` can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuizError::Submission { .. })
    }
}
