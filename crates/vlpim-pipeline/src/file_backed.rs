//! Collaborators answered from pre-computed files, for running the pipeline
//! on tool output produced elsewhere.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vlpim_common::{BindingRecord, InterfaceMetrics, Result, StructuralMetrics, VlpimError};

use crate::collaborators::{
    BindingPredictor, CandidateSequence, GenerationRequest, InterfaceAnalyzer, SequenceGenerator,
    StructurePrediction, StructurePredictor,
};
use crate::io::{self, FastaRecord};

// ── Binding table ───────────────────────────────────────────────────────────

/// Long-format binding predictions keyed by `seq_id`.
pub struct TableBindingPredictor {
    records: Vec<BindingRecord>,
}

impl TableBindingPredictor {
    pub fn new(records: Vec<BindingRecord>) -> Self {
        Self { records }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let records = io::load_binding_records(path).await?;
        info!("Loaded {} binding records from {:?}", records.len(), path);
        Ok(Self::new(records))
    }
}

#[async_trait]
impl BindingPredictor for TableBindingPredictor {
    async fn predict(
        &self,
        candidates: &[CandidateSequence],
        alleles: &[String],
    ) -> Result<Vec<BindingRecord>> {
        let ids: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        let panel: HashSet<&str> = alleles.iter().map(String::as_str).collect();
        let found: Vec<BindingRecord> = self
            .records
            .iter()
            .filter(|r| ids.contains(r.seq_id.as_str()))
            .filter(|r| panel.is_empty() || panel.contains(r.allele.as_str()))
            .cloned()
            .collect();
        debug!("Binding table answered {} records for {} candidates", found.len(), ids.len());
        Ok(found)
    }
}

// ── Pre-generated candidates ────────────────────────────────────────────────

/// Candidate sequences read from a FASTA file. At most
/// `samples_per_temp * temperatures` are returned, and when positions are
/// fixed, same-length candidates that alter any of them are dropped.
pub struct FastaSequenceGenerator {
    candidates: Vec<FastaRecord>,
}

impl FastaSequenceGenerator {
    pub fn new(candidates: Vec<FastaRecord>) -> Self {
        Self { candidates }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(io::load_fasta(path).await?))
    }
}

fn preserves_fixed(candidate: &str, parent: &str, fixed: &[usize]) -> bool {
    let (c, p) = (candidate.as_bytes(), parent.as_bytes());
    fixed
        .iter()
        .all(|&pos| pos == 0 || pos > p.len() || c.get(pos - 1) == p.get(pos - 1))
}

#[async_trait]
impl SequenceGenerator for FastaSequenceGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        let budget = request.samples_per_temp * request.temperatures.len().max(1);
        let parent = request.parent.as_str();
        let mut dropped = 0usize;
        let sequences: Vec<String> = self
            .candidates
            .iter()
            .map(|r| r.sequence.to_ascii_uppercase())
            .filter(|seq| {
                let keep = seq.len() != parent.len()
                    || preserves_fixed(seq, parent, &request.fixed_positions);
                if !keep {
                    dropped += 1;
                }
                keep
            })
            .take(budget)
            .collect();
        if dropped > 0 {
            warn!("Dropped {} pre-generated candidates that alter fixed epitope positions", dropped);
        }
        Ok(sequences)
    }
}

// ── Structure metrics table ─────────────────────────────────────────────────

/// Per-candidate RMSD and interface metrics
/// (`sequence_id,RMSD,dG_dSASA,packstat,BUNS[,interface_sc,interface_area,structure_path]`).
pub struct TableStructureMetrics {
    rows: HashMap<String, StructuralMetrics>,
}

impl TableStructureMetrics {
    pub fn new(rows: HashMap<String, StructuralMetrics>) -> Self {
        Self { rows }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let rows = io::load_evaluated_candidates(path)
            .await?
            .into_iter()
            .map(|e| (e.candidate.sequence_id, e.metrics))
            .collect();
        Ok(Self::new(rows))
    }

    fn row(&self, id: &str, stage: &str) -> Result<&StructuralMetrics> {
        self.rows
            .get(id)
            .ok_or_else(|| VlpimError::collaborator(stage, format!("no row for {id}")))
    }
}

#[async_trait]
impl StructurePredictor for TableStructureMetrics {
    async fn predict(&self, candidate: &CandidateSequence, reference: &Path) -> Result<StructurePrediction> {
        let row = self.row(&candidate.id, "structure prediction")?;
        let structure_path = row
            .structure_path
            .clone()
            .unwrap_or_else(|| default_structure_path(reference, &candidate.id));
        Ok(StructurePrediction {
            structure_path,
            rmsd: row.rmsd,
        })
    }
}

#[async_trait]
impl InterfaceAnalyzer for TableStructureMetrics {
    async fn analyze(&self, candidate_id: &str, _structure: &Path) -> Result<InterfaceMetrics> {
        self.row(candidate_id, "interface analysis")?
            .interface()
            .ok_or_else(|| {
                VlpimError::collaborator(
                    "interface analysis",
                    format!("incomplete interface metrics for {candidate_id}"),
                )
            })
    }
}

/// Model path assumed for a row without `structure_path`: next to the reference.
pub fn default_structure_path(reference: &Path, candidate_id: &str) -> PathBuf {
    reference
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{candidate_id}.pdb"))
}
