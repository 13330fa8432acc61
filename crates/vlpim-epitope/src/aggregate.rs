//! Per-core binder counts.

use std::collections::HashMap;
use vlpim_common::{BindingRecord, CoreBindingSummary};

use crate::classify::{BindingClass, RankSource};

/// One summary per distinct core, in order of first appearance.
pub fn aggregate_cores(records: &[BindingRecord], source: RankSource) -> Vec<CoreBindingSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for record in records {
        let entry = counts.entry(record.core.as_str()).or_insert_with(|| {
            order.push(record.core.as_str());
            (0, 0)
        });
        match source.classify(record) {
            BindingClass::Strong => entry.0 += 1,
            BindingClass::Weak => entry.1 += 1,
            BindingClass::NonBinder => {}
        }
    }

    order
        .into_iter()
        .map(|core| {
            let (strong, weak) = counts.get(core).copied().unwrap_or_default();
            CoreBindingSummary::new(core, strong, weak)
        })
        .collect()
}
