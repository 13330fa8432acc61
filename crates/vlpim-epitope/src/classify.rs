//! Strong/weak/non-binder classification from a percentile rank.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vlpim_common::BindingRecord;

/// Ranks at or below this are strong binders.
pub const STRONG_BINDER_MAX_RANK: f64 = 1.0;
/// Ranks above the strong cutoff and at or below this are weak binders.
pub const WEAK_BINDER_MAX_RANK: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingClass {
    NonBinder,
    Weak,
    Strong,
}

/// Missing or NaN ranks are non-binders.
pub fn classify_rank(rank: Option<f64>) -> BindingClass {
    match rank {
        Some(r) if r <= STRONG_BINDER_MAX_RANK => BindingClass::Strong,
        Some(r) if r <= WEAK_BINDER_MAX_RANK => BindingClass::Weak,
        _ => BindingClass::NonBinder,
    }
}

/// Which percentile the classifier reads from each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSource {
    /// Eluted-ligand %Rank
    El,
    /// Binding-affinity %Rank
    Ba,
}

impl RankSource {
    /// EL rank is preferred whenever any record carries it; BA rank is the
    /// fallback. `None` means records carry no rank at all.
    pub fn detect(records: &[BindingRecord]) -> Option<Self> {
        if records.iter().any(|r| r.rank_el.is_some()) {
            info!("Using %Rank_EL for binding classification");
            Some(Self::El)
        } else if records.iter().any(|r| r.rank_ba.is_some()) {
            warn!("%Rank_EL not available, using BA rank instead");
            Some(Self::Ba)
        } else {
            None
        }
    }

    pub fn rank_of(&self, record: &BindingRecord) -> Option<f64> {
        match self {
            Self::El => record.rank_el,
            Self::Ba => record.rank_ba,
        }
    }

    pub fn classify(&self, record: &BindingRecord) -> BindingClass {
        classify_rank(self.rank_of(record))
    }
}
