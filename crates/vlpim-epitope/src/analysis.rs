//! Classifier, aggregator, selector and extender chained together.

use std::collections::HashSet;
use tracing::{info, warn};
use vlpim_common::{BindingRecord, CoreBindingSummary, Epitope, ProteinSequence, SelectionConfig};

use crate::aggregate::aggregate_cores;
use crate::classify::RankSource;
use crate::extend::{effective_target_length, extend_record};
use crate::select::{effective_epitope_count, select_cores, select_records, SelectedRecord};

/// Everything the selection produced, kept for reporting.
#[derive(Debug, Clone, Default)]
pub struct EpitopeSelection {
    /// `None` when the records carried no rank and selection was skipped.
    pub rank_source: Option<RankSource>,
    /// Cores in encounter order with their binder counts.
    pub summaries: Vec<CoreBindingSummary>,
    pub selected_cores: Vec<CoreBindingSummary>,
    pub n_effective: usize,
    pub records: Vec<SelectedRecord>,
    /// One epitope per distinct extended region, first occurrence first.
    pub epitopes: Vec<Epitope>,
}

pub fn select_epitopes(
    records: &[BindingRecord],
    parent: &ProteinSequence,
    config: &SelectionConfig,
) -> EpitopeSelection {
    let mut selection = EpitopeSelection::default();
    if records.is_empty() {
        return selection;
    }

    match RankSource::detect(records) {
        Some(source) => {
            selection.rank_source = Some(source);
            selection.summaries = aggregate_cores(records, source);
            info!("Core sequences ranked: {} unique cores", selection.summaries.len());

            selection.n_effective = effective_epitope_count(config.epitopes_number, parent.len());
            selection.selected_cores =
                select_cores(&selection.summaries, selection.n_effective, config.mode);
            selection.records = select_records(records, &selection.selected_cores);
            info!(
                "Selected {} cores, resulting in {} epitope records",
                selection.selected_cores.len(),
                selection.records.len()
            );
        }
        None => {
            warn!("No rank information available, skipping binding-based filtering");
            selection.n_effective = config.epitopes_number;
            selection.records = records
                .iter()
                .cloned()
                .map(|record| SelectedRecord {
                    record,
                    number_of_strong_binding: None,
                })
                .collect();
        }
    }

    let target = effective_target_length(config.epitope_length);
    let mut seen = HashSet::new();
    for selected in &selection.records {
        let epitope = extend_record(
            &selected.record,
            selected.number_of_strong_binding.unwrap_or(0),
            parent,
            target,
        );
        if seen.insert((epitope.core.clone(), epitope.start, epitope.end)) {
            selection.epitopes.push(epitope);
        }
    }
    info!("Extended {} epitope regions to target length {}", selection.epitopes.len(), target);

    selection
}
