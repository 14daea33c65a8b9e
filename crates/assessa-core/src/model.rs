//! Core data model types for assessa.
//!
//! Questions and quizzes are immutable snapshots: they are authored elsewhere,
//! handed to a session at start, and never mutated by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single graded item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its quiz.
    pub id: String,
    /// The question text shown to the learner.
    pub prompt: String,
    /// Question variant and its variant-specific data.
    #[serde(flatten)]
    pub kind: QuestionKind,
    /// Reference answer.
    ///
    /// For multiple-choice this is one of the options, for true-false it is
    /// `"true"` or `"false"`, for short-answer it is compared trimmed and
    /// case-folded.
    pub correct_answer: String,
    /// Weight of this question in the final score.
    #[serde(default = "default_points")]
    pub points: u32,
    /// Optional position (in seconds) in related course media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_timestamp: Option<f64>,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// Multiple-choice question with one point.
    pub fn multiple_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::MultipleChoice { options },
            correct_answer: correct_answer.into(),
            points: default_points(),
            reference_timestamp: None,
        }
    }

    /// True-false question with one point.
    pub fn true_false(id: impl Into<String>, prompt: impl Into<String>, correct: bool) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::TrueFalse,
            correct_answer: correct.to_string(),
            points: default_points(),
            reference_timestamp: None,
        }
    }

    /// Short-answer question with one point.
    pub fn short_answer(
        id: impl Into<String>,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind: QuestionKind::ShortAnswer,
            correct_answer: correct_answer.into(),
            points: default_points(),
            reference_timestamp: None,
        }
    }

    /// Builder-style override of the point value.
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// The answer options, empty for anything but multiple-choice.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::TrueFalse | QuestionKind::ShortAnswer => &[],
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// Variant-specific question data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String> },
    TrueFalse,
    ShortAnswer,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TrueFalse => QuestionType::TrueFalse,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
        }
    }
}

/// The closed set of question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::TrueFalse => write!(f, "true-false"),
            QuestionType::ShortAnswer => write!(f, "short-answer"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "multiple-choice" | "mc" => Ok(QuestionType::MultipleChoice),
            "true-false" | "tf" => Ok(QuestionType::TrueFalse),
            "short-answer" | "sa" => Ok(QuestionType::ShortAnswer),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// An immutable quiz snapshot used for one attempt session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    /// Questions in navigation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Inclusive pass threshold in percent.
    pub passing_score: u8,
    /// Time limit; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    /// Informational here; enforced by whoever records attempt counts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Quiz {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
            passing_score: 70,
            time_limit_minutes: None,
            max_attempts: default_max_attempts(),
        }
    }

    pub fn with_passing_score(mut self, passing_score: u8) -> Self {
        self.passing_score = passing_score;
        self
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit_minutes = Some(minutes);
        self
    }

    /// Time limit in seconds, if any.
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn total_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }
}
