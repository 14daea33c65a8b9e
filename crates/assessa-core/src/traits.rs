//! Collaborator traits consumed by the engine.
//!
//! Implementations live in `assessa-store`; hosts may bring their own.

use async_trait::async_trait;

use crate::attempt::{AttemptContext, QuizAttempt};
use crate::model::Quiz;

/// Read-only source of quiz snapshots.
#[async_trait]
pub trait QuizSource: Send + Sync {
    /// Fetch the quiz with the given identifier.
    async fn fetch(&self, quiz_id: &str) -> anyhow::Result<Quiz>;
}

/// Persistence for finished attempts.
///
/// The session calls [`record`](AttemptStore::record) exactly once per
/// `submit()` and never retries on its own.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Human-readable store name (e.g. "json").
    fn name(&self) -> &str;

    /// Persist a finished attempt.
    async fn record(&self, attempt: &QuizAttempt, context: &AttemptContext) -> anyhow::Result<()>;

    /// All attempts a learner has recorded for a quiz, oldest first.
    async fn attempts_for(&self, learner_id: &str, quiz_id: &str)
        -> anyhow::Result<Vec<QuizAttempt>>;
}
