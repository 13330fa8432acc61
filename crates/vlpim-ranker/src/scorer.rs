//! Batch-relative immunogenicity scoring.
//!
//! Per allele, values are ranked within the batch (average ranks for ties)
//! and the rank's position between the lowest and highest rank is scaled to
//! [0, 100]. Reduce mode flips the scale so the strongest binders score 100;
//! enhance mode keeps it so the strongest binders score 0. Either way a lower
//! overall score means a candidate closer to the mode's goal.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use vlpim_common::{ImmunogenicityMode, ScoreAggregation, ScoredCandidate, ScoringConfig};

use crate::affinity::AffinityTable;
use crate::normalise::{average_ranks, percent_span};

pub struct ImmunogenicityScorer {
    config: ScoringConfig,
}

impl ImmunogenicityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// One scored candidate per table row, in row order.
    pub fn score(&self, table: &AffinityTable) -> Vec<ScoredCandidate> {
        if table.is_empty() {
            debug!("Empty affinity table, nothing to score");
            return Vec::new();
        }

        let mut per_row: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new(); table.len()];
        if table.alleles.is_empty() {
            warn!("No IC50_* or Rank_* columns found, skipping immunogenicity scoring");
        }

        for allele in &table.alleles {
            let column = table.column(allele);
            if column.is_empty() {
                continue;
            }
            let values: Vec<f64> = column.iter().map(|(_, v)| *v).collect();
            let scores = self.score_column(allele, &values);
            for ((row, _), score) in column.iter().zip(scores) {
                per_row[*row].insert(allele.clone(), score);
            }
        }

        let scored: Vec<ScoredCandidate> = table
            .rows
            .iter()
            .zip(per_row)
            .map(|(row, scores)| {
                let overall_score = self.aggregate(&scores);
                ScoredCandidate {
                    sequence_id: row.sequence_id.clone(),
                    sequence: row.sequence.clone(),
                    scores,
                    overall_score,
                }
            })
            .collect();

        info!(
            rows = scored.len(),
            alleles = table.alleles.len(),
            mode = %self.config.mode,
            "Scored immunogenicity"
        );
        scored
    }

    /// Scores for one allele column: batch ranks, span-scaled, mode-flipped.
    /// A constant column gets the neutral score throughout.
    pub fn score_column(&self, allele: &str, values: &[f64]) -> Vec<f64> {
        let ranks = average_ranks(values);
        match percent_span(&ranks) {
            Some(normalized) => normalized
                .into_iter()
                .map(|n| match self.config.mode {
                    ImmunogenicityMode::Reduce => 100.0 - n,
                    ImmunogenicityMode::Enhance => n,
                })
                .collect(),
            None => {
                warn!(
                    "All values identical for {}, assigning neutral score {}",
                    allele, self.config.neutral_score
                );
                vec![self.config.neutral_score; values.len()]
            }
        }
    }

    fn aggregate(&self, scores: &BTreeMap<String, f64>) -> Option<f64> {
        if scores.is_empty() {
            return None;
        }
        let sum: f64 = scores.values().sum();
        Some(match self.config.aggregation {
            ScoreAggregation::Mean => sum / scores.len() as f64,
            ScoreAggregation::Sum => sum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::{AffinityKind, AffinityRow};
    use rand::{Rng, SeedableRng};
    use vlpim_test_utils::affinity_row;

    const A1: &str = "DRB1*01:01";
    const A2: &str = "DRB1*03:01";

    fn ic50_table(rows: &[(&str, &[(&str, f64)])]) -> AffinityTable {
        let mut table = AffinityTable::new(AffinityKind::Ic50);
        for (id, values) in rows {
            table.push_row(AffinityRow::new(id, affinity_row(values)));
        }
        table
    }

    fn three_binders() -> AffinityTable {
        ic50_table(&[
            ("seq1", &[(A1, 25.0), (A2, 30.0)]),
            ("seq2", &[(A1, 150.0), (A2, 180.0)]),
            ("seq3", &[(A1, 400.0), (A2, 420.0)]),
        ])
    }

    fn scorer(mode: ImmunogenicityMode, aggregation: ScoreAggregation) -> ImmunogenicityScorer {
        ImmunogenicityScorer::new(ScoringConfig {
            mode,
            neutral_score: 50.0,
            aggregation,
        })
    }

    #[test]
    fn test_reduce_scores_strong_binders_highest() {
        let scored = scorer(ImmunogenicityMode::Reduce, ScoreAggregation::Mean).score(&three_binders());
        assert_eq!(scored.len(), 3);
        assert!(scored[0].overall_score > scored[2].overall_score);
        assert!((scored[0].scores[A1] - 100.0).abs() < 1e-6);
        assert!((scored[1].scores[A1] - 50.0).abs() < 1e-6);
        assert!((scored[2].scores[A1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_enhance_scores_strong_binders_lowest() {
        let scored = scorer(ImmunogenicityMode::Enhance, ScoreAggregation::Mean).score(&three_binders());
        assert!(scored[0].overall_score < scored[2].overall_score);
        assert!((scored[0].overall_score.unwrap() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_values_get_neutral_score() {
        let table = ic50_table(&[
            ("seq1", &[(A1, 100.0), (A2, 200.0)]),
            ("seq2", &[(A1, 100.0), (A2, 200.0)]),
            ("seq3", &[(A1, 100.0), (A2, 200.0)]),
        ]);
        for mode in [ImmunogenicityMode::Reduce, ImmunogenicityMode::Enhance] {
            for row in scorer(mode, ScoreAggregation::Mean).score(&table) {
                assert_eq!(row.scores[A1], 50.0);
                assert_eq!(row.scores[A2], 50.0);
                assert_eq!(row.overall_score, Some(50.0));
            }
        }
    }

    #[test]
    fn test_empty_table_is_noop() {
        let table = AffinityTable::new(AffinityKind::Ic50);
        assert!(scorer(ImmunogenicityMode::Reduce, ScoreAggregation::Mean).score(&table).is_empty());
    }

    #[test]
    fn test_rows_without_values_have_no_overall() {
        let table = ic50_table(&[("seq1", &[]), ("seq2", &[])]);
        let scored = scorer(ImmunogenicityMode::Reduce, ScoreAggregation::Mean).score(&table);
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|s| s.scores.is_empty() && s.overall_score.is_none()));
    }

    #[test]
    fn test_missing_alleles_do_not_contribute() {
        let table = ic50_table(&[
            ("seq1", &[(A1, 10.0), (A2, 10.0)]),
            ("seq2", &[(A1, 90.0)]),
            ("seq3", &[(A2, 90.0)]),
        ]);
        let mean = scorer(ImmunogenicityMode::Enhance, ScoreAggregation::Mean).score(&table);
        assert_eq!(mean[1].scores.len(), 1);
        assert!((mean[1].overall_score.unwrap() - 100.0).abs() < 1e-6);
        assert!((mean[0].overall_score.unwrap() - 0.0).abs() < 1e-6);

        let sum = scorer(ImmunogenicityMode::Reduce, ScoreAggregation::Sum).score(&table);
        assert!((sum[0].overall_score.unwrap() - 200.0).abs() < 1e-6);
        assert!((sum[2].overall_score.unwrap() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_share_a_score() {
        let table = ic50_table(&[
            ("a", &[(A1, 5.0)]),
            ("b", &[(A1, 50.0)]),
            ("c", &[(A1, 50.0)]),
            ("d", &[(A1, 500.0)]),
        ]);
        let scored = scorer(ImmunogenicityMode::Enhance, ScoreAggregation::Mean).score(&table);
        assert_eq!(scored[1].scores[A1], scored[2].scores[A1]);
        assert!((scored[1].scores[A1] - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let n = rng.gen_range(1..30);
            let mut table = AffinityTable::new(AffinityKind::Ic50);
            for i in 0..n {
                let mut values = BTreeMap::new();
                if rng.gen_bool(0.8) {
                    values.insert(A1.to_string(), rng.gen_range(1.0..5000.0_f64).round());
                }
                values.insert(A2.to_string(), rng.gen_range(0..4) as f64);
                table.push_row(AffinityRow::new(&format!("s{i}"), values));
            }
            for mode in [ImmunogenicityMode::Reduce, ImmunogenicityMode::Enhance] {
                for row in scorer(mode, ScoreAggregation::Mean).score(&table) {
                    for score in row.scores.values() {
                        assert!((0.0..=100.0).contains(score), "{score}");
                    }
                    let overall = row.overall_score.unwrap();
                    assert!((0.0..=100.0).contains(&overall));
                }
            }
        }
    }
}
