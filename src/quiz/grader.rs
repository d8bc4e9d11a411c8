use super::model::Question;
use crate::util::{percent, round2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    pub correct: usize,
    pub total: usize,
    pub accuracy_percent: f64,
}

/// Score an answer slate against its batch.
///
/// Unanswered entries count as wrong. A slate shorter than the batch is
/// treated as unanswered past its end.
pub fn grade(questions: &[Question], answers: &[Option<i64>]) -> Grade {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i).copied().flatten() == Some(q.answer))
        .count();
    let total = questions.len();

    Grade {
        correct,
        total,
        accuracy_percent: percent(correct, total).map(round2).unwrap_or(0.0),
    }
}
