//! TOML quiz parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionKind, QuestionType, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default = "default_passing_score")]
    passing_score: u8,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
}

fn default_passing_score() -> u8 {
    70
}

fn default_max_attempts() -> u32 {
    3
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    question_type: String,
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default = "default_points")]
    points: u32,
    #[serde(default)]
    reference_timestamp: Option<f64>,
}

fn default_points() -> u32 {
    1
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let question_type: QuestionType = q
                .question_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;

            let kind = match question_type {
                QuestionType::MultipleChoice => QuestionKind::MultipleChoice { options: q.options },
                QuestionType::TrueFalse => QuestionKind::TrueFalse,
                QuestionType::ShortAnswer => QuestionKind::ShortAnswer,
            };

            if let Some(ts) = q.reference_timestamp {
                anyhow::ensure!(
                    ts.is_finite() && ts >= 0.0,
                    "question '{}': reference_timestamp must be a non-negative number",
                    q.id
                );
            }

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                kind,
                correct_answer: q.correct_answer,
                points: q.points,
                reference_timestamp: q.reference_timestamp,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        questions,
        passing_score: parsed.quiz.passing_score,
        time_limit_minutes: parsed.quiz.time_limit_minutes,
        max_attempts: parsed.quiz.max_attempts,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// An advisory problem with a quiz definition or an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn quiz(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }

    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a quiz definition for common authoring mistakes.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning::quiz(
            "quiz has no questions and cannot be started",
        ));
    }
    if quiz.passing_score > 100 {
        warnings.push(ValidationWarning::quiz(format!(
            "passing_score {} is above 100 and can never be reached",
            quiz.passing_score
        )));
    }
    if quiz.time_limit_minutes == Some(0) {
        warnings.push(ValidationWarning::quiz(
            "time_limit_minutes is 0; omit it for an unlimited quiz",
        ));
    }
    if quiz.max_attempts == 0 {
        warnings.push(ValidationWarning::quiz("max_attempts must be at least 1"));
    }

    // Check for duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for q in &quiz.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in &quiz.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(&q.id, "prompt is empty"));
        }
        if q.points == 0 {
            warnings.push(ValidationWarning::question(
                &q.id,
                "question is worth 0 points",
            ));
        }

        match &q.kind {
            QuestionKind::MultipleChoice { options } => {
                if options.is_empty() {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        "multiple-choice question has no options",
                    ));
                } else if !options.contains(&q.correct_answer) {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        format!("correct_answer '{}' is not one of the options", q.correct_answer),
                    ));
                }
                let mut seen_options = std::collections::HashSet::new();
                for option in options {
                    if !seen_options.insert(option) {
                        warnings.push(ValidationWarning::question(
                            &q.id,
                            format!("duplicate option: {option}"),
                        ));
                    }
                }
            }
            QuestionKind::TrueFalse => {
                if q.correct_answer != "true" && q.correct_answer != "false" {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        format!(
                            "true-false correct_answer must be \"true\" or \"false\", got '{}'",
                            q.correct_answer
                        ),
                    ));
                }
            }
            QuestionKind::ShortAnswer => {
                if q.correct_answer.trim().is_empty() {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        "short-answer correct_answer is empty",
                    ));
                }
            }
        }
    }

    warnings
}
