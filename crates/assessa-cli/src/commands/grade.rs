//! The `assessa grade` command.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use assessa_core::session::QuizSession;
use assessa_core::traits::AttemptStore;
use assessa_store::MemoryAttemptStore;

use super::{ensure_attempts_left, load_config, resolve_quiz, summary_line};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    quiz_arg: String,
    answers_path: PathBuf,
    elapsed: Option<u64>,
    record: bool,
    json: bool,
    learner: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, learner)?;
    let quiz = resolve_quiz(&quiz_arg, &config).await?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers: BTreeMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers JSON: {}", answers_path.display()))?;

    let store: Arc<dyn AttemptStore> = if record {
        let store: Arc<dyn AttemptStore> = Arc::new(config.attempt_store());
        ensure_attempts_left(store.as_ref(), &config, &quiz).await?;
        store
    } else {
        Arc::new(MemoryAttemptStore::new())
    };

    let mut session = QuizSession::new(store, config.attempt_context());
    session.start(quiz.clone())?;

    for (question_id, raw) in &answers {
        if quiz.question(question_id).is_none() {
            eprintln!("Warning: ignoring answer for unknown question '{question_id}'");
            continue;
        }
        if !session.set_raw_answer(question_id, raw) {
            eprintln!("Warning: ignoring invalid answer for '{question_id}': {raw:?}");
        }
    }

    let warnings = session.validate();
    let attempt = session
        .submit_after(Duration::from_secs(elapsed.unwrap_or(0)))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&attempt)?);
        return Ok(());
    }

    println!("{}", quiz.title);
    println!("{}", summary_line(&attempt, &quiz));
    for w in &warnings {
        if let Some(id) = &w.question_id {
            println!("  [{id}] {}", w.message);
        }
    }
    if record {
        println!("Recorded attempt {}", attempt.id);
    }

    Ok(())
}
