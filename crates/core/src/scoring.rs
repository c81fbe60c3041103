//! Reduces an answer sequence to a single score.

use crate::model::AnswerRecord;

/// Lowest score a well-formed configuration can produce.
pub const SCORE_RANGE_MIN: f64 = 1.0;

/// Highest score a well-formed configuration can produce.
pub const SCORE_RANGE_MAX: f64 = 5.0;

/// Arithmetic mean of the recorded option values.
///
/// Returns `0.0` for an empty slice. Zero is a "no score yet" sentinel and
/// must not be fed to tier resolution; tier ranges start at
/// [`SCORE_RANGE_MIN`].
#[must_use]
pub fn average_score(answers: &[AnswerRecord]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }
    let total: f64 = answers.iter().map(|answer| answer.value).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = answers.len() as f64;
    total / count
}

/// Rounds a score to two decimals for display.
#[must_use]
pub fn display_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OptionId, QuestionId};

    fn answer(q: &str, value: f64) -> AnswerRecord {
        AnswerRecord::new(
            QuestionId::new(q).unwrap(),
            OptionId::new("a").unwrap(),
            value,
        )
    }

    #[test]
    fn empty_answers_score_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn score_is_the_mean() {
        let answers = vec![answer("q1", 1.0), answer("q2", 4.0), answer("q3", 4.0)];
        assert_eq!(average_score(&answers), 3.0);
    }

    #[test]
    fn score_ignores_order() {
        let forward = vec![answer("q1", 5.0), answer("q2", 2.0), answer("q3", 3.5)];
        let mut reversed = forward.clone();
        reversed.reverse();
        let rotated = vec![forward[1].clone(), forward[2].clone(), forward[0].clone()];

        let expected = average_score(&forward);
        assert!((average_score(&reversed) - expected).abs() < f64::EPSILON);
        assert!((average_score(&rotated) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn score_is_not_rounded() {
        let answers = vec![answer("q1", 1.0), answer("q2", 2.0), answer("q3", 2.0)];
        let score = average_score(&answers);
        assert!((score - 5.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(display_score(score), 1.67);
    }
}
