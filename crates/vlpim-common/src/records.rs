//! Core records passed between pipeline stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ── Binding predictions ──────────────────────────────────────────────────────

/// One peptide/allele observation reported by an MHC-II binding predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    pub sequence: String,
    /// Minimal binding core; equals `sequence` when the predictor gives none.
    pub core: String,
    /// 1-based, inclusive.
    pub start: usize,
    pub end: usize,
    pub rank_el: Option<f64>,
    pub rank_ba: Option<f64>,
    pub ic50: Option<f64>,
    pub allele: String,
    pub seq_id: String,
}

impl BindingRecord {
    /// Record for `peptide` starting at `start`; `end` follows from the peptide length.
    pub fn new(seq_id: &str, allele: &str, peptide: &str, start: usize) -> Self {
        let start = start.max(1);
        Self {
            sequence: peptide.to_string(),
            core: peptide.to_string(),
            start,
            end: start.saturating_add(peptide.len().saturating_sub(1)),
            rank_el: None,
            rank_ba: None,
            ic50: None,
            allele: allele.to_string(),
            seq_id: seq_id.to_string(),
        }
    }

    pub fn with_core(mut self, core: &str) -> Self {
        if !core.is_empty() {
            self.core = core.to_string();
        }
        self
    }

    pub fn with_rank_el(mut self, rank: f64) -> Self {
        self.rank_el = Some(rank);
        self
    }

    pub fn with_rank_ba(mut self, rank: f64) -> Self {
        self.rank_ba = Some(rank);
        self
    }

    pub fn with_ic50(mut self, ic50: f64) -> Self {
        self.ic50 = Some(ic50);
        self
    }
}

/// Binder counts for every record sharing one core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreBindingSummary {
    pub core: String,
    pub strong_count: usize,
    pub weak_count: usize,
    /// `strong_count + weak_count`. Weak binders are included.
    pub number_of_strong_binding: usize,
}

impl CoreBindingSummary {
    pub fn new(core: &str, strong_count: usize, weak_count: usize) -> Self {
        Self {
            core: core.to_string(),
            strong_count,
            weak_count,
            number_of_strong_binding: strong_count + weak_count,
        }
    }
}

/// A selected region after extension, positioned in the parent sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epitope {
    pub sequence: String,
    pub start: usize,
    pub end: usize,
    pub core: String,
    pub number_of_strong_binding: usize,
}

impl Epitope {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// 1-based parent positions covered by this epitope.
    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

// ── Scored candidates ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub sequence_id: String,
    #[serde(default)]
    pub sequence: Option<String>,
    /// Allele name to score in [0, 100]. Alleles without a value are absent.
    pub scores: BTreeMap<String, f64>,
    /// Aggregate of `scores`; `None` when the row has no allele values.
    pub overall_score: Option<f64>,
}

// ── Structural evaluation ───────────────────────────────────────────────────

/// Interface metrics reported by the interface analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMetrics {
    pub dg_dsasa: f64,
    pub packstat: f64,
    pub buns: f64,
    #[serde(default)]
    pub interface_sc: Option<f64>,
    #[serde(default)]
    pub interface_area: Option<f64>,
}

impl InterfaceMetrics {
    pub fn new(dg_dsasa: f64, packstat: f64, buns: f64) -> Self {
        Self {
            dg_dsasa,
            packstat,
            buns,
            interface_sc: None,
            interface_area: None,
        }
    }
}

/// Structural metrics of one candidate. Each may be missing on its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralMetrics {
    pub rmsd: Option<f64>,
    pub dg_dsasa: Option<f64>,
    pub packstat: Option<f64>,
    pub buns: Option<f64>,
    pub interface_sc: Option<f64>,
    pub interface_area: Option<f64>,
    pub structure_path: Option<PathBuf>,
}

impl StructuralMetrics {
    pub fn with_interface(mut self, interface: &InterfaceMetrics) -> Self {
        self.dg_dsasa = Some(interface.dg_dsasa);
        self.packstat = Some(interface.packstat);
        self.buns = Some(interface.buns);
        self.interface_sc = interface.interface_sc;
        self.interface_area = interface.interface_area;
        self
    }

    /// The interface metrics, if dG/dSASA, packstat and BUNS are all known.
    pub fn interface(&self) -> Option<InterfaceMetrics> {
        Some(InterfaceMetrics {
            dg_dsasa: self.dg_dsasa?,
            packstat: self.packstat?,
            buns: self.buns?,
            interface_sc: self.interface_sc,
            interface_area: self.interface_area,
        })
    }
}

/// A scored candidate after structure prediction and interface analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedCandidate {
    pub candidate: ScoredCandidate,
    pub metrics: StructuralMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl InterfaceQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for InterfaceQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal artifact: an evaluated candidate with its position in the final order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: ScoredCandidate,
    pub metrics: StructuralMetrics,
    pub interface_quality: Option<InterfaceQuality>,
    pub passes_filters: bool,
    /// 1-based.
    pub rank: usize,
}
