//! In-place extension of a core to the target epitope length.
//!
//! Up to two residues are taken toward the N-terminus first, then up to four
//! toward the C-terminus from whatever budget remains. Both sides are clipped
//! at the sequence termini and every residue comes from the parent.

use tracing::{debug, warn};
use vlpim_common::{BindingRecord, Epitope, ProteinSequence};

pub const MIN_EPITOPE_LENGTH: usize = 9;
pub const MAX_EPITOPE_LENGTH: usize = 15;
pub const MAX_FORWARD_EXTENSION: usize = 2;
pub const MAX_BACKWARD_EXTENSION: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRegion {
    pub sequence: String,
    /// 1-based, inclusive.
    pub start: usize,
    pub end: usize,
}

/// Lengths outside 9-15 fall back to 15.
pub fn effective_target_length(requested: usize) -> usize {
    if (MIN_EPITOPE_LENGTH..=MAX_EPITOPE_LENGTH).contains(&requested) {
        requested
    } else {
        warn!(
            "Invalid epitope_length {}, must be {}-{}. Using {}.",
            requested, MIN_EPITOPE_LENGTH, MAX_EPITOPE_LENGTH, MAX_EPITOPE_LENGTH
        );
        MAX_EPITOPE_LENGTH
    }
}

/// Extend the core at `start..=end` (1-based) toward `target` residues.
/// A core already at or above `target` comes back unchanged.
pub fn extend_region(
    parent: &ProteinSequence,
    core: &str,
    start: usize,
    end: usize,
    target: usize,
) -> ExtendedRegion {
    let unchanged = ExtendedRegion {
        sequence: core.to_string(),
        start,
        end,
    };
    if core.len() >= target {
        return unchanged;
    }

    let needed = target - core.len();
    let forward = needed.min(MAX_FORWARD_EXTENSION);
    let backward = (needed - forward).min(MAX_BACKWARD_EXTENSION);

    let new_start = start.saturating_sub(forward).max(1);
    let new_end = end.saturating_add(backward).min(parent.len());

    match parent.window(new_start, new_end) {
        Some(window) => {
            debug!(
                "Extended core {} ({}aa) at [{}-{}] to {} ({}aa) at [{}-{}]",
                core,
                core.len(),
                start,
                end,
                window,
                window.len(),
                new_start,
                new_end
            );
            ExtendedRegion {
                sequence: window.to_string(),
                start: new_start,
                end: new_end,
            }
        }
        None => {
            warn!(
                "Core {} at [{}-{}] lies outside the parent sequence ({} aa), left unextended",
                core,
                start,
                end,
                parent.len()
            );
            unchanged
        }
    }
}

/// Position of the record's core in the parent. The core is looked up inside
/// its peptide; if it cannot be found the whole peptide window is used.
fn core_location(record: &BindingRecord) -> (String, usize, usize) {
    if record.core != record.sequence {
        if let Some(offset) = record.sequence.find(record.core.as_str()) {
            let core_start = record.start + offset;
            return (
                record.core.clone(),
                core_start,
                core_start + record.core.len().saturating_sub(1),
            );
        }
        debug!(
            "Core {} not found in peptide {}, extending the peptide window",
            record.core, record.sequence
        );
    }
    (record.sequence.clone(), record.start, record.end)
}

/// Build an [`Epitope`] from a selected record.
pub fn extend_record(
    record: &BindingRecord,
    number_of_strong_binding: usize,
    parent: &ProteinSequence,
    target: usize,
) -> Epitope {
    let (core_text, core_start, core_end) = core_location(record);
    let region = extend_region(parent, &core_text, core_start, core_end, target);
    Epitope {
        sequence: region.sequence,
        start: region.start,
        end: region.end,
        core: record.core.clone(),
        number_of_strong_binding,
    }
}
