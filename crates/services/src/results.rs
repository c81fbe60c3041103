use quiz_core::model::{AnswerRecord, QuizConfiguration, ResultTier};
use quiz_core::resolver::resolve_tier;
use quiz_core::scoring::average_score;

/// Why a finished attempt sends the user back to the start view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnReason {
    EmptyAnswerSet,
    NoMatchingTier { score: f64 },
}

/// What the result view should do with a finished attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultOutcome {
    /// The tier carries a redirect; leave for `url`.
    Redirect {
        tier: ResultTier,
        score: f64,
        url: String,
    },
    /// Render the tier in place.
    Show { tier: ResultTier, score: f64 },
    ReturnToStart(ReturnReason),
}

impl ResultOutcome {
    #[must_use]
    pub fn tier(&self) -> Option<&ResultTier> {
        match self {
            ResultOutcome::Redirect { tier, .. } | ResultOutcome::Show { tier, .. } => Some(tier),
            ResultOutcome::ReturnToStart(_) => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        match self {
            ResultOutcome::Redirect { score, .. } | ResultOutcome::Show { score, .. } => {
                Some(*score)
            }
            ResultOutcome::ReturnToStart(_) => None,
        }
    }
}

/// Score `answers` and resolve the tier against `config`.
#[must_use]
pub fn evaluate(config: &QuizConfiguration, answers: &[AnswerRecord]) -> ResultOutcome {
    if answers.is_empty() {
        return ResultOutcome::ReturnToStart(ReturnReason::EmptyAnswerSet);
    }

    let score = average_score(answers);
    let Some(tier) = resolve_tier(score, config.results()) else {
        tracing::warn!(score, "no result tier contains score");
        return ResultOutcome::ReturnToStart(ReturnReason::NoMatchingTier { score });
    };

    tracing::debug!(score, tier = %tier.id(), "resolved result tier");
    match tier.redirect_url() {
        Some(url) => ResultOutcome::Redirect {
            url: url.to_owned(),
            tier: tier.clone(),
            score,
        },
        None => ResultOutcome::Show {
            tier: tier.clone(),
            score,
        },
    }
}
