//! Epitope identification: binder classification, per-core aggregation,
//! mode-dependent selection and in-place extension to a target length.

pub mod aggregate;
pub mod analysis;
pub mod classify;
pub mod design;
pub mod extend;
pub mod select;

pub use aggregate::aggregate_cores;
pub use analysis::{select_epitopes, EpitopeSelection};
pub use classify::{classify_rank, BindingClass, RankSource, STRONG_BINDER_MAX_RANK, WEAK_BINDER_MAX_RANK};
pub use design::fixed_positions;
pub use extend::{effective_target_length, extend_record, extend_region, ExtendedRegion};
pub use select::{effective_epitope_count, select_cores, select_records, SelectedRecord};
