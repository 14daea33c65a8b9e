//! Deterministic quiz scoring.
//!
//! [`score`] is a pure function of the question list and the answer store. It
//! is used for final grading and may be called any number of times.

use serde::{Deserialize, Serialize};

use crate::answer::{normalize_text, Answer, AnswerStore};
use crate::model::{Question, QuestionKind};

/// Points awarded for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: String,
    pub earned: u32,
    pub possible: u32,
    pub answered: bool,
    pub correct: bool,
}

/// Result of scoring a whole answer store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub earned_points: u64,
    pub total_points: u64,
    /// `round_half_up(100 * earned / total)`, or 0 when `total_points == 0`.
    pub score_percent: u8,
    pub questions: Vec<QuestionScore>,
}

impl ScoreBreakdown {
    /// Inclusive pass check.
    pub fn passed(&self, passing_score: u8) -> bool {
        self.score_percent >= passing_score
    }
}

/// Whether `answer` is the correct answer to `question`.
///
/// Choice and boolean answers must match exactly. Free text matches when the
/// trimmed, case-folded forms are equal.
pub fn is_correct(question: &Question, answer: &Answer) -> bool {
    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { .. }, Answer::Choice(choice)) => {
            *choice == question.correct_answer
        }
        (QuestionKind::TrueFalse, Answer::Boolean(value)) => {
            value.to_string() == question.correct_answer
        }
        (QuestionKind::ShortAnswer, Answer::Text(text)) => {
            normalize_text(text) == normalize_text(&question.correct_answer)
        }
        _ => false,
    }
}

/// Score `answers` against `questions`.
///
/// Unanswered questions earn nothing but still count toward the total.
pub fn score(questions: &[Question], answers: &AnswerStore) -> ScoreBreakdown {
    let questions: Vec<QuestionScore> = questions
        .iter()
        .map(|q| {
            let answer = answers.get(&q.id);
            let correct = answer.is_some_and(|a| is_correct(q, a));
            QuestionScore {
                question_id: q.id.clone(),
                earned: if correct { q.points } else { 0 },
                possible: q.points,
                answered: answer.is_some_and(Answer::is_filled),
                correct,
            }
        })
        .collect();

    let total_points: u64 = questions.iter().map(|s| u64::from(s.possible)).sum();
    let earned_points: u64 = questions.iter().map(|s| u64::from(s.earned)).sum();

    ScoreBreakdown {
        earned_points,
        total_points,
        score_percent: percent_half_up(earned_points, total_points),
        questions,
    }
}

/// `round(100 * earned / total)` with halves rounded up, in integer math.
pub fn percent_half_up(earned: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let earned = earned.min(total);
    let pct = (200 * earned + total) / (2 * total);
    // earned <= total keeps this within 0..=100
    pct as u8
}
