//! Batch-relative immunogenicity scoring, candidate pre-selection and the
//! final structural ranking.

pub mod affinity;
pub mod candidates;
pub mod interface;
pub mod normalise;
pub mod ranking;
pub mod scorer;

pub use affinity::{AffinityColumn, AffinityKind, AffinityRow, AffinityTable};
pub use candidates::select_top_candidates;
pub use interface::{assess_interface, passes_filters, InterfaceAssessment};
pub use normalise::{average_ranks, percent_span};
pub use ranking::CandidateRanker;
pub use scorer::ImmunogenicityScorer;
