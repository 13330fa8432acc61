//! Residues the sequence generator must leave untouched.

use std::collections::BTreeSet;
use vlpim_common::{Epitope, ImmunogenicityMode};

/// Sorted 1-based parent positions to hold fixed. Reduce mode fixes every
/// residue inside a selected epitope; enhance mode fixes none.
pub fn fixed_positions(epitopes: &[Epitope], mode: ImmunogenicityMode) -> Vec<usize> {
    if !mode.fixes_epitope_positions() {
        return Vec::new();
    }
    epitopes
        .iter()
        .flat_map(|e| e.positions())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
