//! The `assessa take` command.
//!
//! Runs one session on a single task. Stdin lines and the 1-second countdown
//! interval are multiplexed with `select!`, so a tick never interleaves with
//! a half-applied user command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use assessa_core::model::{Question, QuestionKind, Quiz};
use assessa_core::session::{QuizSession, SessionStatus, TickOutcome};
use assessa_core::timer::{self, format_remaining};
use assessa_core::QuizAttempt;

use super::{ensure_attempts_left, load_config, resolve_quiz, summary_line};

/// A parsed line of learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(String),
    Next,
    Previous,
    GoTo(usize),
    Status,
    Submit,
    Quit,
    Help,
    Show,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Show;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Answer(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("n" | "next"), None) => Input::Next,
        (Some("p" | "prev" | "previous"), None) => Input::Previous,
        (Some("g" | "goto"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Input::GoTo(n - 1),
            _ => Input::Unknown(trimmed.to_string()),
        },
        (Some("s" | "status"), None) => Input::Status,
        (Some("submit"), None) => Input::Submit,
        (Some("q" | "quit"), None) => Input::Quit,
        (Some("h" | "help"), None) => Input::Help,
        _ => Input::Unknown(trimmed.to_string()),
    }
}

/// Turn what the learner typed into the raw answer the engine expects.
///
/// Option numbers select multiple-choice options; common spellings of
/// true/false are accepted. Anything else is passed through unchanged.
fn raw_answer(question: &Question, typed: &str) -> String {
    match &question.kind {
        QuestionKind::MultipleChoice { options } => typed
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .cloned()
            .unwrap_or_else(|| typed.trim().to_string()),
        QuestionKind::TrueFalse => match typed.trim().to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" => "true".to_string(),
            "f" | "false" | "n" | "no" => "false".to_string(),
            _ => typed.trim().to_string(),
        },
        QuestionKind::ShortAnswer => typed.to_string(),
    }
}

pub async fn execute(
    quiz_arg: String,
    learner: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, learner)?;
    let quiz = resolve_quiz(&quiz_arg, &config).await?;
    let store = Arc::new(config.attempt_store());
    let used = ensure_attempts_left(store.as_ref(), &config, &quiz).await?;

    let mut session = QuizSession::new(store, config.attempt_context());
    session.start(quiz.clone())?;
    let started = Instant::now();

    println!("{}", quiz.title);
    println!(
        "{} questions, passing score {}%, attempt {} of {}{}",
        quiz.questions.len(),
        quiz.passing_score,
        used + 1,
        quiz.max_attempts,
        match quiz.time_limit_minutes {
            Some(m) => format!(", time limit {m} min"),
            None => String::new(),
        }
    );
    println!("Type :help for commands.\n");
    show_question(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = timer::tick_interval();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nInput closed; session abandoned without submitting.");
                    return Ok(());
                };
                match parse_input(&line) {
                    Input::Answer(typed) => answer_current(&mut session, &typed),
                    Input::Next => {
                        session.next();
                        show_question(&session);
                    }
                    Input::Previous => {
                        session.previous();
                        show_question(&session);
                    }
                    Input::GoTo(index) => {
                        if !session.go_to(index) {
                            println!("No question {}.", index + 1);
                        }
                        show_question(&session);
                    }
                    Input::Status => show_status(&session),
                    Input::Show => show_question(&session),
                    Input::Help => show_help(),
                    Input::Quit => {
                        println!("Session abandoned without submitting.");
                        return Ok(());
                    }
                    Input::Submit => {
                        if !session.is_complete() {
                            println!(
                                "Submitting with {} unanswered or invalid answer(s).",
                                session.validate().len()
                            );
                        }
                        match session.submit_after(started.elapsed()).await {
                            Ok(attempt) => {
                                show_result(&attempt, &quiz);
                                return Ok(());
                            }
                            Err(e) if e.is_retryable() => {
                                println!("{e}\nYour answers are kept. Type :submit to retry.");
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                    Input::Unknown(cmd) => println!("Unknown command '{cmd}'. Type :help."),
                }
            }
            _ = interval.tick(), if session.status() == SessionStatus::InProgress && session.is_timed() => {
                match session.tick().await {
                    Ok(TickOutcome::Expired(attempt)) => {
                        println!("\nTime is up! Your answers were submitted automatically.");
                        show_result(&attempt, &quiz);
                        return Ok(());
                    }
                    Ok(TickOutcome::Remaining(secs)) if secs == 60 || secs == 10 => {
                        println!("[{} remaining]", format_remaining(secs));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        println!("\nTime is up, but {e}\nYour answers are kept. Type :submit to retry.");
                    }
                }
            }
        }
    }
}

fn answer_current(session: &mut QuizSession, typed: &str) {
    let Some(question) = session.current_question().cloned() else {
        return;
    };
    let raw = raw_answer(&question, typed);
    if !session.set_raw_answer(&question.id, &raw) {
        match (session.status(), &question.kind) {
            (SessionStatus::InProgress, QuestionKind::TrueFalse) => {
                println!("Please answer true or false.")
            }
            (SessionStatus::InProgress, _) => println!("That answer could not be recorded."),
            _ => println!("Answers can no longer be changed. Type :submit to retry."),
        }
        return;
    }

    for message in assessa_core::answer::validate_answer(&question, session.answer(&question.id)) {
        println!("Note: {message}");
    }

    if session.is_last_question() {
        if session.is_complete() {
            println!("All questions answered. Type :submit to finish.");
        } else {
            println!("Last question. Type :status to see what is left, or :submit.");
        }
    } else {
        session.next();
        show_question(session);
    }
}

fn show_question(session: &QuizSession) {
    let (Some(question), Some(index), Some(quiz)) =
        (session.current_question(), session.current_index(), session.quiz())
    else {
        return;
    };

    let clock = session
        .remaining_seconds_formatted()
        .map(|t| format!("  [{t} left]"))
        .unwrap_or_default();
    println!(
        "Question {}/{} ({:.0}%){clock}",
        index + 1,
        quiz.questions.len(),
        session.progress_percent()
    );
    let pts = if question.points == 1 { "point" } else { "points" };
    println!("{} ({} {pts})", question.prompt, question.points);

    match &question.kind {
        QuestionKind::MultipleChoice { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {option}", i + 1);
            }
        }
        QuestionKind::TrueFalse => println!("  true / false"),
        QuestionKind::ShortAnswer => println!("  (type your answer)"),
    }

    if let Some(answer) = session.answer(&question.id) {
        println!("Current answer: {}", answer.as_raw());
    }
    println!();
}

fn show_status(session: &QuizSession) {
    let Some(quiz) = session.quiz() else {
        return;
    };
    for (i, q) in quiz.questions.iter().enumerate() {
        let marker = match session.answer(&q.id) {
            Some(a) if a.is_filled() => "x",
            _ => " ",
        };
        let cursor = if session.current_index() == Some(i) { ">" } else { " " };
        println!("{cursor} [{marker}] {}. {}", i + 1, q.prompt);
    }
    if let Some(t) = session.remaining_seconds_formatted() {
        println!("Time left: {t}");
    }
    for w in session.validate() {
        if let Some(id) = &w.question_id {
            println!("  [{id}] {}", w.message);
        }
    }
}

fn show_help() {
    println!("Type an answer (or option number) and press Enter.");
    println!("  :next / :n       next question");
    println!("  :prev / :p       previous question");
    println!("  :goto N          jump to question N");
    println!("  :status / :s     answered questions and time left");
    println!("  :submit          submit your answers");
    println!("  :quit / :q       leave without submitting");
}

fn show_result(attempt: &QuizAttempt, quiz: &Quiz) {
    println!("\n{}", summary_line(attempt, quiz));
    println!("Time spent: {}", format_remaining(attempt.time_spent_seconds));
    println!("Attempt id: {}", attempt.id);
}
