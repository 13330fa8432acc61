//! Pre-selection of candidates before structure prediction.

use std::cmp::Ordering;
use tracing::info;
use vlpim_common::ScoredCandidate;

/// The `max_candidates` rows with the lowest overall score, lowest first.
/// Rows without an overall score are never preferred over scored ones.
///
/// Scores from [`crate::ImmunogenicityScorer`] already point toward the
/// mode's goal, so the lowest scores are wanted in both modes.
pub fn select_top_candidates(scored: &[ScoredCandidate], max_candidates: usize) -> Vec<ScoredCandidate> {
    let mut ordered = scored.to_vec();
    ordered.sort_by(|a, b| match (a.overall_score, b.overall_score) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered.truncate(max_candidates);
    info!(
        "Selected {} of {} candidates for structure prediction",
        ordered.len(),
        scored.len()
    );
    ordered
}
