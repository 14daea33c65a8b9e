//! In-memory attempt store.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use assessa_core::attempt::{AttemptContext, QuizAttempt};
use assessa_core::traits::AttemptStore;

use crate::error::StoreError;

/// An attempt store that keeps everything in process memory.
///
/// Useful for embedding the engine without a filesystem and for testing
/// persistence failures: [`fail_next`](Self::fail_next) makes the following
/// `record` calls fail until cleared.
#[derive(Default)]
pub struct MemoryAttemptStore {
    /// Recorded attempts with their context, oldest first.
    attempts: Mutex<Vec<(AttemptContext, QuizAttempt)>>,
    /// Number of `record` calls made, successful or not.
    call_count: AtomicU32,
    /// When set, `record` fails.
    failing: AtomicBool,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `record` calls fail (`true`) or succeed (`false`).
    pub fn fail_next(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get the number of `record` calls made to this store.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every recorded attempt, oldest first.
    pub fn all(&self) -> Vec<QuizAttempt> {
        self.lock().iter().map(|(_, a)| a.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(AttemptContext, QuizAttempt)>> {
        // A poisoned lock only means another test thread panicked mid-push.
        self.attempts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn record(&self, attempt: &QuizAttempt, context: &AttemptContext) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("configured to fail".into()).into());
        }

        let mut attempts = self.lock();
        // Re-recording the same attempt id replaces it.
        attempts.retain(|(_, a)| a.id != attempt.id);
        attempts.push((context.clone(), attempt.clone()));
        Ok(())
    }

    async fn attempts_for(
        &self,
        learner_id: &str,
        quiz_id: &str,
    ) -> anyhow::Result<Vec<QuizAttempt>> {
        Ok(self
            .lock()
            .iter()
            .filter(|(ctx, a)| ctx.learner_id == learner_id && a.quiz_id == quiz_id)
            .map(|(_, a)| a.clone())
            .collect())
    }
}
