//! Core ranking, the short-sequence cap and mode-dependent selection.

use std::collections::HashMap;
use tracing::info;
use vlpim_common::{BindingRecord, CoreBindingSummary, ImmunogenicityMode};

/// Parents shorter than this get at most [`SHORT_SEQUENCE_MAX_EPITOPES`] cores.
pub const SHORT_SEQUENCE_LENGTH: usize = 200;
pub const SHORT_SEQUENCE_MAX_EPITOPES: usize = 3;

/// A binding record that survived core selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRecord {
    pub record: BindingRecord,
    /// `None` when selection was skipped for lack of rank data.
    pub number_of_strong_binding: Option<usize>,
}

/// Caps the requested count on short parents so mutation windows do not overlap.
pub fn effective_epitope_count(requested: usize, parent_len: usize) -> usize {
    if parent_len < SHORT_SEQUENCE_LENGTH {
        let capped = requested.min(SHORT_SEQUENCE_MAX_EPITOPES);
        if capped < requested {
            info!(
                "Sequence length ({} aa) < {}, limiting epitopes to {}",
                parent_len, SHORT_SEQUENCE_LENGTH, capped
            );
        }
        capped
    } else {
        requested
    }
}

/// Sort cores by binder count (descending, stable) and keep the top `n` in
/// reduce mode or the bottom `n` in enhance mode.
pub fn select_cores(
    summaries: &[CoreBindingSummary],
    n: usize,
    mode: ImmunogenicityMode,
) -> Vec<CoreBindingSummary> {
    let mut ranked = summaries.to_vec();
    // sort_by is stable: equal counts keep encounter order
    ranked.sort_by(|a, b| b.number_of_strong_binding.cmp(&a.number_of_strong_binding));

    let n = n.min(ranked.len());
    match mode {
        ImmunogenicityMode::Reduce => {
            ranked.truncate(n);
            info!("Reduce mode: selecting top {} cores with highest binding", n);
        }
        ImmunogenicityMode::Enhance => {
            let skip = ranked.len() - n;
            ranked.drain(..skip);
            info!("Enhance mode: selecting bottom {} cores with lowest binding", n);
        }
    }
    ranked
}

/// Keep records whose core was selected, annotated with that core's binder count.
pub fn select_records(records: &[BindingRecord], selected: &[CoreBindingSummary]) -> Vec<SelectedRecord> {
    let counts: HashMap<&str, usize> = selected
        .iter()
        .map(|s| (s.core.as_str(), s.number_of_strong_binding))
        .collect();

    records
        .iter()
        .filter_map(|record| {
            counts.get(record.core.as_str()).map(|&count| SelectedRecord {
                record: record.clone(),
                number_of_strong_binding: Some(count),
            })
        })
        .collect()
}
