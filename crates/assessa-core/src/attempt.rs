//! The immutable record of a finished quiz attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer::AnswerStore;
use crate::scoring::ScoreBreakdown;

/// One finalized, scored submission of a quiz by a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Stable for the lifetime of the session, including failed submissions.
    pub id: Uuid,
    pub quiz_id: String,
    /// Snapshot of the answer store at submission time.
    pub answers: AnswerStore,
    pub score_percent: u8,
    pub earned_points: u64,
    pub total_points: u64,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
    pub time_spent_seconds: u64,
    /// Whether the countdown forced this submission.
    #[serde(default)]
    pub auto_submitted: bool,
}

impl QuizAttempt {
    pub(crate) fn build(
        id: Uuid,
        quiz_id: &str,
        answers: &AnswerStore,
        breakdown: &ScoreBreakdown,
        passing_score: u8,
        time_spent_seconds: u64,
        auto_submitted: bool,
    ) -> Self {
        Self {
            id,
            quiz_id: quiz_id.to_string(),
            answers: answers.clone(),
            score_percent: breakdown.score_percent,
            earned_points: breakdown.earned_points,
            total_points: breakdown.total_points,
            passed: breakdown.passed(passing_score),
            completed_at: Utc::now(),
            time_spent_seconds,
            auto_submitted,
        }
    }
}

/// Who the attempt belongs to, passed through to the attempt store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptContext {
    pub learner_id: String,
    #[serde(default)]
    pub course_id: Option<String>,
}

impl AttemptContext {
    pub fn new(learner_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            course_id: None,
        }
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }
}
