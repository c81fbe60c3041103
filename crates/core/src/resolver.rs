//! Maps a score to a result tier.

use crate::model::ResultTier;

/// Returns the first tier, in list order, whose inclusive range contains `score`.
///
/// Overlapping ranges resolve to the earliest-listed tier. Returns `None` when
/// no tier contains the score (gaps, or the `0.0` empty-answer sentinel).
#[must_use]
pub fn resolve_tier(score: f64, tiers: &[ResultTier]) -> Option<&ResultTier> {
    tiers.iter().find(|tier| tier.contains(score))
}
