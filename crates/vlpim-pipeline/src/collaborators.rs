//! Capability contracts for the external tools the pipeline drives.
//!
//! Implementations can wrap:
//! - an MHC-II binding predictor
//! - an inverse-folding sequence generator
//! - a structure predictor with RMSD against the reference
//! - an interface analyzer
//! - pre-computed tables (see [`crate::file_backed`])
//! - mock data (testing)

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use vlpim_common::{
    BindingRecord, Epitope, ImmunogenicityMode, InterfaceMetrics, ProteinSequence, Result,
    VlpimError,
};

/// A sequence handed to a collaborator under a stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSequence {
    pub id: String,
    pub sequence: String,
}

impl CandidateSequence {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

/// Everything a sequence generator is given.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub parent: ProteinSequence,
    pub structure_path: PathBuf,
    pub epitopes: Vec<Epitope>,
    pub mode: ImmunogenicityMode,
    /// 1-based parent positions that must not change.
    pub fixed_positions: Vec<usize>,
    pub samples_per_temp: usize,
    pub temperatures: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructurePrediction {
    pub structure_path: PathBuf,
    /// Against the reference structure; `None` if it could not be computed.
    pub rmsd: Option<f64>,
}

#[async_trait]
pub trait BindingPredictor: Send + Sync {
    /// Per-peptide predictions for every candidate and allele. Records carry
    /// the candidate id in `seq_id`.
    async fn predict(
        &self,
        candidates: &[CandidateSequence],
        alleles: &[String],
    ) -> Result<Vec<BindingRecord>>;
}

#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>>;
}

#[async_trait]
pub trait StructurePredictor: Send + Sync {
    async fn predict(&self, candidate: &CandidateSequence, reference: &Path) -> Result<StructurePrediction>;
}

#[async_trait]
pub trait InterfaceAnalyzer: Send + Sync {
    async fn analyze(&self, candidate_id: &str, structure: &Path) -> Result<InterfaceMetrics>;
}

// ── Mock Implementations for Testing ────────────────────────────────────────

/// Returns canned records for whichever candidates are asked about.
#[derive(Default)]
pub struct MockBindingPredictor {
    records: Vec<BindingRecord>,
}

impl MockBindingPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, record: BindingRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = BindingRecord>) -> Self {
        self.records.extend(records);
        self
    }
}

#[async_trait]
impl BindingPredictor for MockBindingPredictor {
    async fn predict(
        &self,
        candidates: &[CandidateSequence],
        alleles: &[String],
    ) -> Result<Vec<BindingRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| candidates.iter().any(|c| c.id == r.seq_id))
            .filter(|r| alleles.is_empty() || alleles.contains(&r.allele))
            .cloned()
            .collect())
    }
}

/// Returns a fixed list of sequences and remembers the last request.
#[derive(Default)]
pub struct MockSequenceGenerator {
    sequences: Vec<String>,
    last_request: std::sync::Mutex<Option<GenerationRequest>>,
}

impl MockSequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sequence: &str) -> Self {
        self.sequences.push(sequence.to_string());
        self
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SequenceGenerator for MockSequenceGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        Ok(self.sequences.clone())
    }
}

/// RMSD per candidate id; unknown ids fail.
#[derive(Default)]
pub struct MockStructurePredictor {
    rmsd: HashMap<String, f64>,
}

impl MockStructurePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, candidate_id: &str, rmsd: f64) -> Self {
        self.rmsd.insert(candidate_id.to_string(), rmsd);
        self
    }
}

#[async_trait]
impl StructurePredictor for MockStructurePredictor {
    async fn predict(&self, candidate: &CandidateSequence, reference: &Path) -> Result<StructurePrediction> {
        let rmsd = self.rmsd.get(&candidate.id).copied().ok_or_else(|| {
            VlpimError::collaborator("structure prediction", format!("no model for {}", candidate.id))
        })?;
        let dir = reference.parent().unwrap_or_else(|| Path::new("."));
        Ok(StructurePrediction {
            structure_path: dir.join(format!("{}_model.pdb", candidate.id)),
            rmsd: Some(rmsd),
        })
    }
}

/// Interface metrics per candidate id; unknown ids fail.
#[derive(Default)]
pub struct MockInterfaceAnalyzer {
    metrics: HashMap<String, InterfaceMetrics>,
}

impl MockInterfaceAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, candidate_id: &str, metrics: InterfaceMetrics) -> Self {
        self.metrics.insert(candidate_id.to_string(), metrics);
        self
    }
}

#[async_trait]
impl InterfaceAnalyzer for MockInterfaceAnalyzer {
    async fn analyze(&self, candidate_id: &str, _structure: &Path) -> Result<InterfaceMetrics> {
        self.metrics.get(candidate_id).cloned().ok_or_else(|| {
            VlpimError::collaborator("interface analysis", format!("no metrics for {candidate_id}"))
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
