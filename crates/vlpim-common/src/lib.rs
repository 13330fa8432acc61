//! Shared data model, configuration and error types for VLPIM.

pub mod alleles;
pub mod config;
pub mod error;
pub mod mode;
pub mod records;
pub mod sequence;

pub use alleles::{normalize_allele, DEFAULT_DRB1_PANEL};
pub use config::{FilterThresholds, PipelineConfig, ScoreAggregation, ScoringConfig, SelectionConfig};
pub use error::{Result, VlpimError};
pub use mode::ImmunogenicityMode;
pub use records::{
    BindingRecord, CoreBindingSummary, Epitope, EvaluatedCandidate, InterfaceMetrics,
    InterfaceQuality, RankedCandidate, ScoredCandidate, StructuralMetrics,
};
pub use sequence::ProteinSequence;
