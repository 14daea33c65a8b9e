//! The `assessa attempts` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};

use assessa_core::timer::format_remaining;
use assessa_core::traits::AttemptStore;

use super::load_config;

pub async fn execute(
    quiz_id: String,
    learner: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, learner)?;
    let store = config.attempt_store();
    let attempts = store.attempts_for(&config.learner_id, &quiz_id).await?;

    if attempts.is_empty() {
        println!("No attempts recorded for {} on '{quiz_id}'.", config.learner_id);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Completed", "Score", "Result", "Time", "Answered", "Attempt"]);

    for (i, attempt) in attempts.iter().enumerate() {
        let result = match (attempt.passed, attempt.auto_submitted) {
            (true, _) => "passed",
            (false, true) => "failed (timed out)",
            (false, false) => "failed",
        };
        table.add_row(vec![
            (i + 1).to_string(),
            attempt.completed_at.format("%Y-%m-%d %H:%M").to_string(),
            format!("{}%", attempt.score_percent),
            result.to_string(),
            format_remaining(attempt.time_spent_seconds),
            attempt.answers.len().to_string(),
            attempt.id.to_string(),
        ]);
    }

    println!("{} on '{quiz_id}'", config.learner_id);
    println!("{table}");

    let best = attempts.iter().map(|a| a.score_percent).max().unwrap_or(0);
    println!("Best score: {best}%");

    Ok(())
}
