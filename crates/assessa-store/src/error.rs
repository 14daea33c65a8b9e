//! Store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing stored attempts and quizzes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested quiz does not exist in the source.
    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    /// The store was configured to reject writes (used in tests).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An attempt file exists but could not be decoded.
    #[error("corrupt attempt file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
