//! Fixture builders shared by the workspace's tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use vlpim_common::{
    BindingRecord, EvaluatedCandidate, InterfaceMetrics, ProteinSequence, ScoredCandidate,
    StructuralMetrics,
};

pub use pretty_assertions;

pub const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Reproducible random protein of `len` residues.
pub fn synthetic_parent(len: usize, seed: u64) -> ProteinSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    let residues: String = (0..len)
        .map(|_| AMINO_ACIDS[rng.gen_range(0..AMINO_ACIDS.len())] as char)
        .collect();
    ProteinSequence::new(&residues).unwrap()
}

/// `total` records for the core at `start..start+core_len` of `parent`, the
/// first `binders` of them strong (rank 0.5) and the rest non-binders.
pub fn records_for_core(
    parent: &ProteinSequence,
    start: usize,
    core_len: usize,
    total: usize,
    binders: usize,
) -> Vec<BindingRecord> {
    let core = parent.window(start, start + core_len - 1).unwrap();
    (0..total)
        .map(|i| {
            let rank = if i < binders { 0.5 } else { 25.0 };
            BindingRecord::new("parent", &format!("DRB1*{:02}:01", i + 1), core, start)
                .with_rank_el(rank)
        })
        .collect()
}

/// Wide-table row: allele name to value.
pub fn affinity_row(values: &[(&str, f64)]) -> BTreeMap<String, f64> {
    values.iter().map(|(a, v)| (a.to_string(), *v)).collect()
}

pub fn scored(sequence_id: &str, overall: f64) -> ScoredCandidate {
    ScoredCandidate {
        sequence_id: sequence_id.to_string(),
        sequence: None,
        scores: BTreeMap::new(),
        overall_score: Some(overall),
    }
}

pub fn evaluated(
    sequence_id: &str,
    rmsd: Option<f64>,
    dg_dsasa: f64,
    packstat: f64,
    buns: f64,
) -> EvaluatedCandidate {
    EvaluatedCandidate {
        candidate: scored(sequence_id, 50.0),
        metrics: StructuralMetrics {
            rmsd,
            ..Default::default()
        }
        .with_interface(&InterfaceMetrics::new(dg_dsasa, packstat, buns)),
    }
}

/// Candidate whose structural evaluation failed entirely.
pub fn unevaluated(sequence_id: &str) -> EvaluatedCandidate {
    EvaluatedCandidate {
        candidate: scored(sequence_id, 50.0),
        metrics: StructuralMetrics::default(),
    }
}
