//! The quiz session state machine.
//!
//! A [`QuizSession`] owns everything about one learner's attempt: the quiz
//! snapshot, the cursor, the answer store, the countdown, and the finished
//! attempt. It is driven from a single task; user operations and timer ticks
//! take `&mut self` and so never overlap.
//!
//! ```text
//! NotStarted -> InProgress -> Submitting -> Submitted
//!                   ^              |
//!                   |              v
//!                 retake        Failed -> (submit again)
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer::{validate_answer, Answer, AnswerStore, Rejection};
use crate::attempt::{AttemptContext, QuizAttempt};
use crate::error::QuizError;
use crate::model::{Question, Quiz};
use crate::parser::ValidationWarning;
use crate::scoring;
use crate::timer::{self, Countdown, Tick};
use crate::traits::AttemptStore;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
    Failed,
}

/// What a timer tick did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The session is not ticking (untimed, not in progress, or finished).
    Idle,
    /// Seconds left after this tick.
    Remaining(u64),
    /// Time ran out and the attempt was submitted.
    Expired(QuizAttempt),
}

/// State that exists only once a quiz has been loaded.
#[derive(Debug, Clone)]
struct Active {
    quiz: Quiz,
    attempt_id: Uuid,
    current_index: usize,
    answers: AnswerStore,
    countdown: Option<Countdown>,
    /// Caller-supplied elapsed time for untimed quizzes.
    wall_clock_secs: Option<u64>,
    /// Set once the countdown expiry has tried to submit.
    auto_submitted: bool,
}

impl Active {
    fn new(quiz: Quiz) -> Self {
        let countdown = quiz.time_limit_secs().map(Countdown::new);
        Self {
            quiz,
            attempt_id: Uuid::new_v4(),
            current_index: 0,
            answers: AnswerStore::new(),
            countdown,
            wall_clock_secs: None,
            auto_submitted: false,
        }
    }

    fn time_spent_secs(&self) -> u64 {
        match &self.countdown {
            Some(countdown) => countdown.elapsed_secs(),
            None => self.wall_clock_secs.unwrap_or(0),
        }
    }
}

/// One learner's quiz session.
pub struct QuizSession {
    store: Arc<dyn AttemptStore>,
    context: AttemptContext,
    status: SessionStatus,
    last_error: Option<String>,
    active: Option<Active>,
    attempt: Option<QuizAttempt>,
}

impl QuizSession {
    /// A session in `NotStarted` that records attempts to `store`.
    pub fn new(store: Arc<dyn AttemptStore>, context: AttemptContext) -> Self {
        Self {
            store,
            context,
            status: SessionStatus::NotStarted,
            last_error: None,
            active: None,
            attempt: None,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Begin an attempt of `quiz`.
    ///
    /// Any attempt in progress is discarded first, together with its
    /// countdown. A quiz without questions or with a zero time limit leaves
    /// the session `Failed` and returns [`QuizError::Configuration`].
    pub fn start(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        if let Some(previous) = self.active.take() {
            tracing::debug!(
                quiz_id = %previous.quiz.id,
                attempt_id = %previous.attempt_id,
                "discarding previous session"
            );
        }
        self.attempt = None;

        let reason = if quiz.questions.is_empty() {
            Some("quiz has no questions")
        } else if quiz.time_limit_minutes == Some(0) {
            Some("time limit must be at least one minute")
        } else {
            None
        };
        if let Some(reason) = reason {
            let err = QuizError::Configuration {
                quiz_id: quiz.id.clone(),
                reason: reason.into(),
            };
            tracing::warn!("{err}");
            self.status = SessionStatus::Failed;
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        let active = Active::new(quiz);
        tracing::info!(
            quiz_id = %active.quiz.id,
            attempt_id = %active.attempt_id,
            questions = active.quiz.questions.len(),
            time_limit_secs = ?active.quiz.time_limit_secs(),
            "quiz started"
        );
        self.active = Some(active);
        self.status = SessionStatus::InProgress;
        self.last_error = None;
        Ok(())
    }

    /// Start over from the same quiz snapshot with a fresh answer store,
    /// cursor and countdown. Returns `false` if no quiz was ever loaded.
    ///
    /// Whether another attempt is allowed is the host's decision.
    pub fn retake(&mut self) -> bool {
        let Some(quiz) = self.active.as_ref().map(|a| a.quiz.clone()) else {
            tracing::debug!("retake ignored: no quiz loaded");
            return false;
        };
        tracing::info!(quiz_id = %quiz.id, "retaking quiz");
        self.start(quiz).is_ok()
    }

    /// Score the current answers and record the attempt.
    ///
    /// Allowed from `InProgress` and from `Failed` (after a previous
    /// persistence failure). After `Submitted` it returns the attempt that
    /// was already recorded. Completeness is not required.
    pub async fn submit(&mut self) -> Result<QuizAttempt, QuizError> {
        self.finish(false).await
    }

    /// Like [`submit`](Self::submit), supplying the caller's wall-clock time
    /// for quizzes without a time limit. Ignored for timed quizzes.
    pub async fn submit_after(&mut self, elapsed: Duration) -> Result<QuizAttempt, QuizError> {
        if let Some(active) = self.active.as_mut() {
            if active.countdown.is_none() && self.status != SessionStatus::Submitted {
                active.wall_clock_secs = Some(elapsed.as_secs());
            }
        }
        self.finish(false).await
    }

    async fn finish(&mut self, auto_submitted: bool) -> Result<QuizAttempt, QuizError> {
        if let Some(attempt) = &self.attempt {
            tracing::debug!(attempt_id = %attempt.id, "already submitted");
            return Ok(attempt.clone());
        }

        // `Submitting` here means an earlier submit future was dropped
        // mid-flight; treat it like a failure and try again.
        match self.status {
            SessionStatus::InProgress | SessionStatus::Failed | SessionStatus::Submitting => {}
            SessionStatus::NotStarted | SessionStatus::Submitted => {
                return Err(QuizError::NotStarted)
            }
        }
        let Some(active) = self.active.as_mut() else {
            return Err(QuizError::NotStarted);
        };

        self.status = SessionStatus::Submitting;
        active.auto_submitted |= auto_submitted;
        let auto_submitted = active.auto_submitted;
        if let Some(countdown) = active.countdown.as_mut() {
            countdown.stop();
        }

        let breakdown = scoring::score(&active.quiz.questions, &active.answers);
        let attempt = QuizAttempt::build(
            active.attempt_id,
            &active.quiz.id,
            &active.answers,
            &breakdown,
            active.quiz.passing_score,
            active.time_spent_secs(),
            auto_submitted,
        );

        match self.store.record(&attempt, &self.context).await {
            Ok(()) => {
                tracing::info!(
                    quiz_id = %attempt.quiz_id,
                    attempt_id = %attempt.id,
                    score = attempt.score_percent,
                    passed = attempt.passed,
                    time_spent_secs = attempt.time_spent_seconds,
                    auto_submitted,
                    "attempt recorded"
                );
                self.status = SessionStatus::Submitted;
                self.last_error = None;
                self.attempt = Some(attempt.clone());
                Ok(attempt)
            }
            Err(e) => {
                let err = QuizError::Submission {
                    attempt_id: attempt.id.to_string(),
                    message: format!("{e:#}"),
                };
                tracing::warn!(store = self.store.name(), "{err}");
                self.status = SessionStatus::Failed;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Ticks are ignored unless the session is `InProgress` with a time limit.
    /// The tick that reaches zero submits the attempt; a persistence failure
    /// from that submission is returned as an error and the session is left
    /// `Failed` with the countdown frozen at zero.
    pub async fn tick(&mut self) -> Result<TickOutcome, QuizError> {
        if self.status != SessionStatus::InProgress {
            return Ok(TickOutcome::Idle);
        }
        let Some(countdown) = self.active.as_mut().and_then(|a| a.countdown.as_mut()) else {
            return Ok(TickOutcome::Idle);
        };

        match countdown.tick() {
            Tick::Idle => Ok(TickOutcome::Idle),
            Tick::Remaining(secs) => {
                tracing::trace!(remaining_secs = secs, "tick");
                Ok(TickOutcome::Remaining(secs))
            }
            Tick::Expired => {
                tracing::info!("time expired, submitting");
                self.finish(true).await.map(TickOutcome::Expired)
            }
        }
    }

    /// Drive the countdown from a tokio interval until the session leaves
    /// `InProgress`. Returns the attempt if time ran out.
    ///
    /// Untimed sessions return immediately with `None`.
    pub async fn run_countdown(&mut self) -> Result<Option<QuizAttempt>, QuizError> {
        if !self.is_timed() {
            return Ok(None);
        }
        let mut interval = timer::tick_interval();
        while self.status == SessionStatus::InProgress {
            interval.tick().await;
            match self.tick().await? {
                TickOutcome::Expired(attempt) => return Ok(Some(attempt)),
                TickOutcome::Remaining(_) => {}
                TickOutcome::Idle => break,
            }
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Navigation and answers
    // -----------------------------------------------------------------------

    /// Move the cursor. Out-of-range indexes and calls outside `InProgress`
    /// are ignored. Returns whether the cursor moved.
    pub fn go_to(&mut self, index: usize) -> bool {
        let Some(active) = self.in_progress_mut("go_to") else {
            return false;
        };
        if index >= active.quiz.questions.len() {
            tracing::debug!(index, "go_to ignored: out of range");
            return false;
        }
        active.current_index = index;
        true
    }

    /// Move to the next question; a no-op on the last one.
    pub fn next(&mut self) -> bool {
        match self.current_index() {
            Some(index) => self.go_to(index + 1),
            None => false,
        }
    }

    /// Move to the previous question; a no-op on the first one.
    pub fn previous(&mut self) -> bool {
        match self.current_index() {
            Some(index) if index > 0 => self.go_to(index - 1),
            _ => false,
        }
    }

    /// Upsert the answer for `question_id` without moving the cursor.
    ///
    /// Ignored outside `InProgress`, for unknown question ids, and for an
    /// answer of the wrong kind. Returns whether the answer was stored.
    pub fn set_answer(&mut self, question_id: &str, answer: Answer) -> bool {
        let Some(active) = self.in_progress_mut("set_answer") else {
            return false;
        };
        let Some(question) = active.quiz.questions.iter().find(|q| q.id == question_id) else {
            tracing::warn!(question_id, "answer ignored: {:?}", Rejection::UnknownQuestion);
            return false;
        };
        match active.answers.set(question, answer) {
            Ok(_) => true,
            Err(rejection) => {
                tracing::warn!(question_id, "answer ignored: {rejection:?}");
                false
            }
        }
    }

    /// [`set_answer`](Self::set_answer) from the raw string a UI captured.
    pub fn set_raw_answer(&mut self, question_id: &str, raw: &str) -> bool {
        let answer = self
            .quiz()
            .and_then(|quiz| quiz.question(question_id))
            .and_then(|question| Answer::from_raw(question, raw));
        match answer {
            Some(answer) => self.set_answer(question_id, answer),
            None => {
                tracing::warn!(question_id, raw, "answer ignored: not a valid value");
                false
            }
        }
    }

    fn in_progress_mut(&mut self, op: &str) -> Option<&mut Active> {
        if self.status != SessionStatus::InProgress {
            tracing::debug!(status = ?self.status, "{op} ignored: session not in progress");
            return None;
        }
        self.active.as_mut()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn context(&self) -> &AttemptContext {
        &self.context
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.active.as_ref().map(|a| &a.quiz)
    }

    pub fn answers(&self) -> Option<&AnswerStore> {
        self.active.as_ref().map(|a| &a.answers)
    }

    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers().and_then(|answers| answers.get(question_id))
    }

    /// The recorded attempt, once `Submitted`.
    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.attempt.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.current_index)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.active
            .as_ref()
            .and_then(|a| a.quiz.questions.get(a.current_index))
    }

    /// `100 * (index + 1) / len`.
    pub fn progress_percent(&self) -> f64 {
        match &self.active {
            Some(a) => 100.0 * (a.current_index + 1) as f64 / a.quiz.questions.len() as f64,
            None => 0.0,
        }
    }

    pub fn is_first_question(&self) -> bool {
        self.current_index() == Some(0)
    }

    pub fn is_last_question(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.current_index + 1 == a.quiz.questions.len())
    }

    /// Every question has an answer that passes validation.
    pub fn is_complete(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.answers.answered_count(&a.quiz.questions) == a.quiz.questions.len())
    }

    /// Advisory per-question messages for missing or malformed answers.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let Some(active) = &self.active else {
            return Vec::new();
        };
        active
            .quiz
            .questions
            .iter()
            .flat_map(|q| {
                validate_answer(q, active.answers.get(&q.id))
                    .into_iter()
                    .map(|message| ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message,
                    })
            })
            .collect()
    }

    pub fn is_timed(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.countdown.is_some())
    }

    /// Seconds left, or `None` for untimed sessions.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.active
            .as_ref()
            .and_then(|a| a.countdown.as_ref())
            .map(Countdown::remaining_secs)
    }

    /// Seconds left as `m:ss`, or `None` for untimed sessions.
    pub fn remaining_seconds_formatted(&self) -> Option<String> {
        self.remaining_seconds().map(timer::format_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Records attempts in memory; can be told to fail.
    #[derive(Default)]
    struct TestStore {
        fail: AtomicBool,
        calls: AtomicU32,
        recorded: Mutex<Vec<QuizAttempt>>,
    }

    #[async_trait]
    impl AttemptStore for TestStore {
        fn name(&self) -> &str {
            "test"
        }

        async fn record(&self, attempt: &QuizAttempt, _: &AttemptContext) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("store unavailable");
            }
            self.recorded.lock().unwrap().push(attempt.clone());
            Ok(())
        }

        async fn attempts_for(&self, _: &str, quiz_id: &str) -> anyhow::Result<Vec<QuizAttempt>> {
            Ok(self
                .recorded
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.quiz_id == quiz_id)
                .cloned()
                .collect())
        }
    }

    fn ppe_quiz() -> Quiz {
        Quiz::new(
            "ppe",
            "PPE Basics",
            vec![
                Question::multiple_choice(
                    "q1",
                    "Which item protects your eyes?",
                    vec!["Goggles".into(), "Earplugs".into()],
                    "Goggles",
                )
                .with_points(5),
                Question::true_false("q2", "Inspect gloves before use.", true).with_points(5),
                Question::short_answer("q3", "What does PPE stand for?", "Personal Protective Equipment")
                    .with_points(5),
            ],
        )
        .with_passing_score(70)
    }

    fn session() -> (Arc<TestStore>, QuizSession) {
        let store = Arc::new(TestStore::default());
        let session = QuizSession::new(store.clone(), AttemptContext::new("learner-1"));
        (store, session)
    }

    #[test]
    fn start_initializes_session() {
        let (_, mut s) = session();
        assert_eq!(s.status(), SessionStatus::NotStarted);
        s.start(ppe_quiz().with_time_limit(1)).unwrap();

        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.current_index(), Some(0));
        assert!(s.answers().unwrap().is_empty());
        assert_eq!(s.remaining_seconds(), Some(60));
        assert_eq!(s.remaining_seconds_formatted().as_deref(), Some("1:00"));
    }

    #[test]
    fn start_empty_quiz_fails() {
        let (_, mut s) = session();
        let err = s.start(Quiz::new("empty", "Empty", vec![])).unwrap_err();
        assert!(matches!(err, QuizError::Configuration { .. }));
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.last_error().unwrap().contains("no questions"));
        assert!(s.current_question().is_none());
    }

    #[tokio::test]
    async fn zero_time_limit_is_rejected() {
        let (store, mut s) = session();
        let err = s.start(ppe_quiz().with_time_limit(0)).unwrap_err();
        assert!(matches!(err, QuizError::Configuration { .. }));
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.last_error().unwrap().contains("time limit"));
        assert!(!s.is_timed());

        for _ in 0..5 {
            assert_eq!(s.tick().await.unwrap(), TickOutcome::Idle);
        }
        assert!(matches!(s.submit().await, Err(QuizError::NotStarted)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_before_start_is_an_error() {
        let (store, mut s) = session();
        assert!(matches!(s.submit().await, Err(QuizError::NotStarted)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn navigation_is_clamped() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();

        assert!(s.is_first_question());
        assert!(!s.previous());
        assert_eq!(s.current_index(), Some(0));

        assert!(s.next());
        assert!(s.next());
        assert!(s.is_last_question());
        assert!(!s.next());
        assert_eq!(s.current_index(), Some(2));

        assert!(!s.go_to(3));
        assert_eq!(s.current_index(), Some(2));
        assert!(s.go_to(1));
        assert_eq!(s.current_question().unwrap().id, "q2");
    }

    #[test]
    fn progress_percent_follows_cursor() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        assert!((s.progress_percent() - 100.0 / 3.0).abs() < 1e-9);
        s.go_to(2);
        assert!((s.progress_percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn set_answer_upserts_without_moving_cursor() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();

        assert!(s.set_answer("q2", Answer::Boolean(false)));
        assert!(s.set_answer("q2", Answer::Boolean(true)));
        assert_eq!(s.answer("q2"), Some(&Answer::Boolean(true)));
        assert_eq!(s.current_index(), Some(0));
        assert_eq!(s.answers().unwrap().len(), 1);
    }

    #[test]
    fn set_answer_rejects_unknown_ids_and_wrong_kinds() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();

        assert!(!s.set_answer("q9", Answer::Boolean(true)));
        assert!(!s.set_answer("q3", Answer::Boolean(true)));
        assert!(!s.set_raw_answer("q2", "yes"));
        assert!(s.answers().unwrap().is_empty());
    }

    #[test]
    fn completeness_and_validation() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        assert!(!s.is_complete());
        assert_eq!(s.validate().len(), 3);

        s.set_raw_answer("q1", "Helmet");
        s.set_raw_answer("q2", "true");
        s.set_raw_answer("q3", "   ");
        assert!(!s.is_complete());
        let warnings = s.validate();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].question_id.as_deref(), Some("q1"));
        assert_eq!(warnings[1].message, "answer is blank");

        s.set_raw_answer("q3", "ppe");
        assert!(!s.is_complete());
        assert_eq!(s.validate().len(), 1);

        s.set_raw_answer("q1", "Earplugs");
        assert!(s.is_complete());
        assert!(s.validate().is_empty());
    }

    #[test]
    fn off_list_choice_is_stored_but_incomplete() {
        let (_, mut s) = session();
        s.start(Quiz::new(
            "one",
            "One",
            vec![Question::multiple_choice(
                "a",
                "Pick",
                vec!["A".into(), "B".into()],
                "A",
            )],
        ))
        .unwrap();

        assert!(s.set_raw_answer("a", "Zebra"));
        assert_eq!(s.answer("a"), Some(&Answer::Choice("Zebra".into())));
        assert!(!s.is_complete());
        assert!(s.validate()[0].message.contains("not one of the available options"));
    }

    #[tokio::test]
    async fn two_of_three_correct_fails_at_70() {
        let (store, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        s.set_raw_answer("q1", "Goggles");
        s.set_raw_answer("q2", "true");
        s.set_raw_answer("q3", "safety gear");

        let attempt = s.submit().await.unwrap();
        assert_eq!(attempt.score_percent, 67);
        assert!(!attempt.passed);
        assert_eq!(s.status(), SessionStatus::Submitted);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_correct_passes() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        s.set_raw_answer("q1", "Goggles");
        s.set_raw_answer("q2", "true");
        s.set_raw_answer("q3", "  personal protective equipment ");

        let attempt = s.submit().await.unwrap();
        assert_eq!(attempt.score_percent, 100);
        assert!(attempt.passed);
    }

    #[tokio::test]
    async fn resubmit_returns_same_attempt() {
        let (store, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        s.set_raw_answer("q1", "Goggles");

        let first = s.submit().await.unwrap();
        let second = s.submit().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submitted_session_is_frozen() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        s.set_raw_answer("q1", "Goggles");
        let attempt = s.submit().await.unwrap();

        assert!(!s.set_raw_answer("q1", "Earplugs"));
        assert!(!s.next());
        assert!(!s.go_to(2));
        assert_eq!(s.current_index(), Some(0));
        assert_eq!(s.answer("q1"), Some(&Answer::Choice("Goggles".into())));
        assert_eq!(attempt.answers.get("q1"), Some(&Answer::Choice("Goggles".into())));
    }

    #[tokio::test]
    async fn untimed_submit_uses_caller_clock() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        s.set_raw_answer("q1", "Goggles");
        s.set_raw_answer("q2", "true");

        let attempt = s.submit_after(Duration::from_secs(95)).await.unwrap();
        assert_eq!(attempt.time_spent_seconds, 95);
        assert_eq!(attempt.score_percent, 67);
        assert_eq!(attempt.answers.len(), 2);
        assert!(!attempt.auto_submitted);
    }

    #[tokio::test]
    async fn failed_submission_is_recoverable() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();
        s.set_raw_answer("q1", "Goggles");
        for _ in 0..10 {
            s.tick().await.unwrap();
        }

        store.fail.store(true, Ordering::SeqCst);
        let err = s.submit().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(s.status(), SessionStatus::Failed);
        assert!(s.last_error().unwrap().contains("store unavailable"));

        // Frozen while failed.
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Idle);
        assert!(!s.set_raw_answer("q2", "true"));
        assert_eq!(s.remaining_seconds(), Some(50));

        store.fail.store(false, Ordering::SeqCst);
        let attempt = s.submit().await.unwrap();
        assert_eq!(attempt.time_spent_seconds, 10);
        assert_eq!(attempt.answers.get("q1"), Some(&Answer::Choice("Goggles".into())));
        assert_eq!(s.status(), SessionStatus::Submitted);
        assert!(s.last_error().is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn attempt_id_survives_failed_submission() {
        let (store, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        store.fail.store(true, Ordering::SeqCst);
        let err = s.submit().await.unwrap_err();
        store.fail.store(false, Ordering::SeqCst);
        let attempt = s.submit().await.unwrap();
        assert!(err.to_string().contains(&attempt.id.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_forces_submission() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();
        s.set_raw_answer("q2", "true");

        let attempt = s.run_countdown().await.unwrap().expect("time should expire");
        assert_eq!(s.status(), SessionStatus::Submitted);
        assert_eq!(attempt.time_spent_seconds, 60);
        assert!(attempt.auto_submitted);
        assert_eq!(attempt.score_percent, 33);
        assert_eq!(s.remaining_seconds(), Some(0));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sixty_manual_ticks_expire_exactly_once() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();

        for expected in (1..60).rev() {
            assert_eq!(s.tick().await.unwrap(), TickOutcome::Remaining(expected));
        }
        let TickOutcome::Expired(attempt) = s.tick().await.unwrap() else {
            panic!("60th tick should expire");
        };
        assert_eq!(attempt.time_spent_seconds, 60);
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_after_failed_expiry_stays_auto_submitted() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();
        store.fail.store(true, Ordering::SeqCst);

        for _ in 0..59 {
            s.tick().await.unwrap();
        }
        assert!(s.tick().await.is_err());
        assert_eq!(s.status(), SessionStatus::Failed);
        assert_eq!(s.remaining_seconds(), Some(0));

        store.fail.store(false, Ordering::SeqCst);
        let attempt = s.submit().await.unwrap();
        assert!(attempt.auto_submitted);
        assert_eq!(attempt.time_spent_seconds, 60);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn manual_submit_stops_ticks() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();
        s.tick().await.unwrap();
        s.submit().await.unwrap();

        for _ in 0..120 {
            assert_eq!(s.tick().await.unwrap(), TickOutcome::Idle);
        }
        assert_eq!(s.remaining_seconds(), Some(59));
        assert_eq!(s.attempt().unwrap().time_spent_seconds, 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn untimed_session_does_not_tick() {
        let (_, mut s) = session();
        s.start(ppe_quiz()).unwrap();
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(s.remaining_seconds(), None);
        assert_eq!(s.run_countdown().await.unwrap(), None);
    }

    #[tokio::test]
    async fn retake_resets_everything() {
        let (store, mut s) = session();
        s.start(ppe_quiz().with_time_limit(2)).unwrap();
        s.set_raw_answer("q1", "Goggles");
        s.go_to(2);
        s.tick().await.unwrap();
        let first = s.submit().await.unwrap();

        assert!(s.retake());
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.current_index(), Some(0));
        assert!(s.answers().unwrap().is_empty());
        assert_eq!(s.remaining_seconds(), Some(120));
        assert!(s.attempt().is_none());

        let second = s.submit().await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.attempts_for("learner-1", "ppe").await.unwrap().len(), 2);
    }

    #[test]
    fn retake_without_quiz_is_ignored() {
        let (_, mut s) = session();
        assert!(!s.retake());
        assert_eq!(s.status(), SessionStatus::NotStarted);
    }

    #[tokio::test]
    async fn restart_replaces_running_countdown() {
        let (_, mut s) = session();
        s.start(ppe_quiz().with_time_limit(1)).unwrap();
        for _ in 0..30 {
            s.tick().await.unwrap();
        }
        s.start(ppe_quiz().with_time_limit(2)).unwrap();
        assert_eq!(s.remaining_seconds(), Some(120));
        assert_eq!(s.tick().await.unwrap(), TickOutcome::Remaining(119));
    }
}
