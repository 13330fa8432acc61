//! Final multi-key ordering of structurally evaluated candidates.

use std::cmp::Ordering;
use tracing::info;
use vlpim_common::{config::FilterThresholds, EvaluatedCandidate, RankedCandidate};

use crate::interface::{assess_interface, passes_filters};

/// Compare two optional metrics with missing (or NaN) values last,
/// whichever direction the metric sorts.
fn nulls_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// RMSD ascending, then dG/dSASA ascending, packstat descending and BUNS ascending.
fn compare(a: &EvaluatedCandidate, b: &EvaluatedCandidate) -> Ordering {
    let (ma, mb) = (&a.metrics, &b.metrics);
    nulls_last(ma.rmsd, mb.rmsd, false)
        .then_with(|| nulls_last(ma.dg_dsasa, mb.dg_dsasa, false))
        .then_with(|| nulls_last(ma.packstat, mb.packstat, true))
        .then_with(|| nulls_last(ma.buns, mb.buns, false))
}

pub struct CandidateRanker {
    thresholds: FilterThresholds,
}

impl CandidateRanker {
    pub fn new(thresholds: FilterThresholds) -> Self {
        Self { thresholds }
    }

    /// Stable total order with 1-based ranks. Candidates equal on every key
    /// keep their input order. Threshold flags and interface grades are
    /// attached but never change the order.
    pub fn rank(&self, mut candidates: Vec<EvaluatedCandidate>) -> Vec<RankedCandidate> {
        candidates.sort_by(compare);
        let ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, evaluated)| {
                let interface_quality = evaluated
                    .metrics
                    .interface()
                    .map(|m| assess_interface(&m).quality);
                let passes_filters = passes_filters(&evaluated.metrics, &self.thresholds);
                RankedCandidate {
                    candidate: evaluated.candidate,
                    metrics: evaluated.metrics,
                    interface_quality,
                    passes_filters,
                    rank: i + 1,
                }
            })
            .collect();

        let passing = ranked.iter().filter(|r| r.passes_filters).count();
        info!("Ranked {} candidates, {} pass all thresholds", ranked.len(), passing);
        ranked
    }
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(FilterThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlpim_test_utils::{evaluated, unevaluated};

    fn ids(ranked: &[RankedCandidate]) -> Vec<&str> {
        ranked.iter().map(|r| r.candidate.sequence_id.as_str()).collect()
    }

    #[test]
    fn test_rmsd_dominates() {
        let rows = vec![
            evaluated("seq1", Some(1.5), -0.6, 0.7, 3.0),
            evaluated("seq2", Some(2.1), -0.3, 0.5, 7.0),
            evaluated("seq3", Some(1.8), -0.8, 0.8, 2.0),
            evaluated("seq4", Some(2.5), -0.2, 0.4, 9.0),
        ];
        let ranked = CandidateRanker::default().rank(rows);
        assert_eq!(ids(&ranked), vec!["seq1", "seq3", "seq2", "seq4"]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_tie_breaks_in_key_order() {
        let rows = vec![
            evaluated("worse_dg", Some(1.0), -0.5, 0.9, 0.0),
            evaluated("low_pack", Some(1.0), -0.9, 0.6, 0.0),
            evaluated("high_pack_more_buns", Some(1.0), -0.9, 0.8, 4.0),
            evaluated("high_pack_few_buns", Some(1.0), -0.9, 0.8, 1.0),
        ];
        let ranked = CandidateRanker::default().rank(rows);
        assert_eq!(
            ids(&ranked),
            vec!["high_pack_few_buns", "high_pack_more_buns", "low_pack", "worse_dg"]
        );
    }

    #[test]
    fn test_missing_values_sort_last() {
        let rows = vec![
            unevaluated("nothing"),
            evaluated("no_rmsd", None, -3.0, 0.9, 0.0),
            evaluated("nan_rmsd", Some(f64::NAN), -3.0, 0.9, 0.0),
            evaluated("has_rmsd", Some(3.0), -0.1, 0.1, 9.0),
        ];
        let ranked = CandidateRanker::default().rank(rows);
        assert_eq!(ids(&ranked), vec!["has_rmsd", "no_rmsd", "nan_rmsd", "nothing"]);
        assert!(ranked[3].interface_quality.is_none());
        assert!(!ranked[3].passes_filters);
    }

    #[test]
    fn test_full_ties_keep_input_order_and_repeat() {
        let rows = vec![
            evaluated("first", Some(1.2), -1.0, 0.7, 2.0),
            evaluated("second", Some(1.2), -1.0, 0.7, 2.0),
            evaluated("third", Some(1.2), -1.0, 0.7, 2.0),
        ];
        let ranker = CandidateRanker::default();
        let once = ranker.rank(rows.clone());
        let twice = ranker.rank(rows);
        assert_eq!(ids(&once), vec!["first", "second", "third"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_each_key_nulls_last_independently() {
        let mut no_dg = evaluated("no_dg", Some(1.0), 0.0, 0.9, 0.0);
        no_dg.metrics.dg_dsasa = None;
        let rows = vec![no_dg, evaluated("has_dg", Some(1.0), 5.0, 0.1, 9.0)];
        let ranked = CandidateRanker::default().rank(rows);
        assert_eq!(ids(&ranked), vec!["has_dg", "no_dg"]);
        assert!(ranked[1].interface_quality.is_none());
    }

    #[test]
    fn test_flags_and_grades_attached() {
        let rows = vec![evaluated("seq5", Some(1.2), -0.7, 0.9, 1.0)];
        let ranked = CandidateRanker::default().rank(rows);
        assert!(ranked[0].passes_filters);
        // dG -0.7 -> 0, packstat 0.9 -> 3, BUNS 1 -> 3
        assert_eq!(ranked[0].interface_quality, Some(vlpim_common::InterfaceQuality::Good));
    }
}
