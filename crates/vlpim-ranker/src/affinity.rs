//! Wide per-allele affinity table.
//!
//! Allele columns are recognised once, where the table enters the system
//! (`IC50_<allele>` or `Rank_<allele>` headers, or a pivot of binding records).
//! Past that point alleles are plain map keys.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use vlpim_common::{normalize_allele, BindingRecord};

/// What the table's values measure. Lower is stronger binding for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffinityKind {
    /// nM
    Ic50,
    /// Percentile rank
    Rank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityColumn {
    pub kind: AffinityKind,
    pub allele: String,
}

fn column_regex() -> Option<&'static Regex> {
    use std::sync::OnceLock;
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(IC50|Rank)_(.+)$").ok()).as_ref()
}

impl AffinityColumn {
    pub fn parse(header: &str) -> Option<Self> {
        let caps = column_regex()?.captures(header.trim())?;
        let kind = if caps[1].eq_ignore_ascii_case("ic50") {
            AffinityKind::Ic50
        } else {
            AffinityKind::Rank
        };
        Some(Self {
            kind,
            allele: normalize_allele(&caps[2]),
        })
    }

    /// Pick the value columns of a wide table: IC50 columns when any exist,
    /// otherwise rank columns. Returns header indices with their alleles.
    pub fn select<S: AsRef<str>>(headers: &[S]) -> Option<(AffinityKind, Vec<(usize, String)>)> {
        let parsed: Vec<(usize, AffinityColumn)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| Self::parse(h.as_ref()).map(|c| (i, c)))
            .collect();

        for kind in [AffinityKind::Ic50, AffinityKind::Rank] {
            let columns: Vec<(usize, String)> = parsed
                .iter()
                .filter(|(_, c)| c.kind == kind)
                .map(|(i, c)| (*i, c.allele.clone()))
                .collect();
            if !columns.is_empty() {
                return Some((kind, columns));
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityRow {
    pub sequence_id: String,
    pub sequence: Option<String>,
    /// Allele to value. Missing pairs are absent, never a sentinel.
    pub values: BTreeMap<String, f64>,
}

impl AffinityRow {
    pub fn new(sequence_id: &str, values: BTreeMap<String, f64>) -> Self {
        Self {
            sequence_id: sequence_id.to_string(),
            sequence: None,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityTable {
    pub kind: AffinityKind,
    /// Column order, first appearance first.
    pub alleles: Vec<String>,
    pub rows: Vec<AffinityRow>,
}

impl AffinityTable {
    pub fn new(kind: AffinityKind) -> Self {
        Self {
            kind,
            alleles: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: AffinityRow) {
        for allele in row.values.keys() {
            if !self.alleles.contains(allele) {
                self.alleles.push(allele.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pivot per-peptide binding records into one row per `seq_id`. Several
    /// peptides of the same candidate and allele are averaged. IC50 is used
    /// when any record carries it, otherwise the EL (or BA) rank.
    pub fn from_records(records: &[BindingRecord]) -> Self {
        let kind = if records.iter().any(|r| r.ic50.is_some()) {
            AffinityKind::Ic50
        } else {
            AffinityKind::Rank
        };

        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, BTreeMap<String, (f64, usize)>> = HashMap::new();
        for record in records {
            let value = match kind {
                AffinityKind::Ic50 => record.ic50,
                AffinityKind::Rank => record.rank_el.or(record.rank_ba),
            };
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            let per_allele = sums.entry(record.seq_id.clone()).or_insert_with(|| {
                order.push(record.seq_id.clone());
                BTreeMap::new()
            });
            let slot = per_allele
                .entry(normalize_allele(&record.allele))
                .or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }

        let mut table = Self::new(kind);
        for seq_id in order {
            let values = sums
                .remove(&seq_id)
                .unwrap_or_default()
                .into_iter()
                .map(|(allele, (sum, count))| (allele, sum / count as f64))
                .collect();
            table.push_row(AffinityRow::new(&seq_id, values));
        }
        debug!(
            "Pivoted {} binding records into {} rows x {} alleles",
            records.len(),
            table.len(),
            table.alleles.len()
        );
        table
    }

    /// Attach candidate sequences by id.
    pub fn with_sequences(mut self, sequences: &HashMap<String, String>) -> Self {
        for row in &mut self.rows {
            if let Some(seq) = sequences.get(&row.sequence_id) {
                row.sequence = Some(seq.clone());
            }
        }
        self
    }

    /// `(row index, value)` for every row that has a value for `allele`.
    pub fn column(&self, allele: &str) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.values.get(allele).map(|v| (i, *v)))
            .filter(|(_, v)| v.is_finite())
            .collect()
    }
}
