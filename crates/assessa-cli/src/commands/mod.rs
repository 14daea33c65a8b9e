//! Subcommand implementations and the helpers they share.

pub mod attempts;
pub mod grade;
pub mod init;
pub mod take;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use assessa_core::model::Quiz;
use assessa_core::parser;
use assessa_core::traits::{AttemptStore, QuizSource};
use assessa_core::QuizAttempt;
use assessa_store::config::{load_config_from, AssessaConfig};

/// Load the config and apply a `--learner` override.
pub fn load_config(config_path: Option<PathBuf>, learner: Option<String>) -> Result<AssessaConfig> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(learner) = learner {
        anyhow::ensure!(!learner.trim().is_empty(), "--learner must not be empty");
        config.learner_id = learner;
    }
    Ok(config)
}

/// A `.toml` path is parsed directly; anything else is a quiz id.
pub async fn resolve_quiz(quiz: &str, config: &AssessaConfig) -> Result<Quiz> {
    let path = Path::new(quiz);
    if path.extension().is_some_and(|ext| ext == "toml") || path.is_file() {
        tracing::debug!(path = %path.display(), "loading quiz from file");
        return parser::parse_quiz(path);
    }
    config
        .quiz_source()
        .fetch(quiz)
        .await
        .with_context(|| format!("looking in {}", config.quiz_dir.display()))
}

/// Fail if the learner has used up the quiz's attempts.
pub async fn ensure_attempts_left(
    store: &dyn AttemptStore,
    config: &AssessaConfig,
    quiz: &Quiz,
) -> Result<usize> {
    let used = store.attempts_for(&config.learner_id, &quiz.id).await?.len();
    if config.enforce_max_attempts {
        anyhow::ensure!(
            used < quiz.max_attempts as usize,
            "{} has used all {} attempts at '{}'",
            config.learner_id,
            quiz.max_attempts,
            quiz.id
        );
    }
    Ok(used)
}

/// One-line outcome of an attempt.
pub fn summary_line(attempt: &QuizAttempt, quiz: &Quiz) -> String {
    let verdict = if attempt.passed { "PASSED" } else { "FAILED" };
    format!(
        "Score: {}% ({}/{} points) {} (passing score {}%)",
        attempt.score_percent,
        attempt.earned_points,
        attempt.total_points,
        verdict,
        quiz.passing_score
    )
}
