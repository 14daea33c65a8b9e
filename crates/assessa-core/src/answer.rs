//! Learner answers and the per-session answer store.
//!
//! Answers are a closed tagged value so that, for example, a boolean answer on
//! a short-answer question cannot be represented. The store canonicalizes on
//! write: free text is trimmed and case-folded, choice and boolean answers are
//! kept verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionKind, QuestionType};

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// The exact text of the selected multiple-choice option.
    Choice(String),
    /// A true-false answer.
    Boolean(bool),
    /// A short free-text answer.
    Text(String),
}

impl Answer {
    /// Build an answer for `question` from the raw string the UI captured.
    ///
    /// Multiple-choice and short-answer accept any string. True-false accepts
    /// exactly `"true"` or `"false"`; anything else yields `None`.
    pub fn from_raw(question: &Question, raw: &str) -> Option<Answer> {
        match &question.kind {
            QuestionKind::MultipleChoice { .. } => Some(Answer::Choice(raw.to_string())),
            QuestionKind::TrueFalse => match raw {
                "true" => Some(Answer::Boolean(true)),
                "false" => Some(Answer::Boolean(false)),
                _ => None,
            },
            QuestionKind::ShortAnswer => Some(Answer::Text(raw.to_string())),
        }
    }

    /// The question variant this answer belongs to.
    pub fn question_type(&self) -> QuestionType {
        match self {
            Answer::Choice(_) => QuestionType::MultipleChoice,
            Answer::Boolean(_) => QuestionType::TrueFalse,
            Answer::Text(_) => QuestionType::ShortAnswer,
        }
    }

    /// Whether the answer carries a value (blank text does not).
    pub fn is_filled(&self) -> bool {
        match self {
            Answer::Choice(s) | Answer::Text(s) => !s.trim().is_empty(),
            Answer::Boolean(_) => true,
        }
    }

    /// The answer as the raw string the UI would show.
    pub fn as_raw(&self) -> String {
        match self {
            Answer::Choice(s) | Answer::Text(s) => s.clone(),
            Answer::Boolean(b) => b.to_string(),
        }
    }

    fn canonical(self) -> Answer {
        match self {
            Answer::Text(s) => Answer::Text(normalize_text(&s)),
            other => other,
        }
    }
}

/// Trim surrounding whitespace and case-fold.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Why an answer was not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnknownQuestion,
    KindMismatch {
        expected: QuestionType,
        got: QuestionType,
    },
}

/// Mapping from question id to the learner's current answer.
///
/// Keys are always ids of the quiz the store was created for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    answers: BTreeMap<String, Answer>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the answer for `question`, canonicalizing it first.
    pub fn set(&mut self, question: &Question, answer: Answer) -> Result<&Answer, Rejection> {
        let expected = question.question_type();
        if answer.question_type() != expected {
            return Err(Rejection::KindMismatch {
                expected,
                got: answer.question_type(),
            });
        }
        self.answers.insert(question.id.clone(), answer.canonical());
        Ok(&self.answers[&question.id])
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Number of questions in `questions` whose answer passes
    /// [`validate_answer`]. Blank text and off-list choices do not count.
    pub fn answered_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| validate_answer(q, self.get(&q.id)).is_empty())
            .count()
    }
}

/// Advisory messages about the shape of one question's answer.
///
/// An empty list means the answer is present and well-formed. This never
/// decides correctness.
pub fn validate_answer(question: &Question, answer: Option<&Answer>) -> Vec<String> {
    let mut messages = Vec::new();

    let Some(answer) = answer else {
        messages.push("question has not been answered".to_string());
        return messages;
    };

    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { options }, Answer::Choice(choice)) => {
            if !options.iter().any(|o| o == choice) {
                messages.push(format!("'{choice}' is not one of the available options"));
            }
        }
        (QuestionKind::TrueFalse, Answer::Boolean(_)) => {}
        (QuestionKind::ShortAnswer, Answer::Text(text)) => {
            if text.trim().is_empty() {
                messages.push("answer is blank".to_string());
            }
        }
        (kind, answer) => {
            messages.push(format!(
                "{} answer given to a {} question",
                answer.question_type(),
                kind.question_type()
            ));
        }
    }

    messages
}
