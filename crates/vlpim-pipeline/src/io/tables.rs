//! CSV tables: binding predictions, epitope lists, scored and ranked candidates.

use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};
use vlpim_common::{
    normalize_allele, BindingRecord, Epitope, EvaluatedCandidate, RankedCandidate, Result,
    ScoredCandidate, StructuralMetrics, VlpimError,
};
use vlpim_ranker::{AffinityColumn, AffinityRow, AffinityTable};

use super::columns::{self, *};
use super::{read_input, table_name, write_output};

/// Record id used for the parent sequence's own binding predictions.
pub const PARENT_SEQ_ID: &str = "parent";

// ── Header lookup ────────────────────────────────────────────────────────────

struct Header {
    table: String,
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    fn new(table: &str, headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();
        Self {
            table: table.to_string(),
            names,
            index,
        }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|a| self.index.get(&a.to_ascii_lowercase()).copied())
    }

    fn require(&self, aliases: &[&str]) -> Result<usize> {
        self.find(aliases)
            .ok_or_else(|| VlpimError::missing_column(&self.table, aliases[0]))
    }
}

struct Row<'a> {
    table: &'a str,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }

    fn malformed(&self, message: String) -> VlpimError {
        VlpimError::MalformedRow {
            table: self.table.to_string(),
            line: self.line(),
            message,
        }
    }

    /// Trimmed cell text; blank and NA-like cells count as missing.
    fn text(&self, idx: Option<usize>) -> Option<&'a str> {
        let raw = self.record.get(idx?)?.trim();
        match raw.to_ascii_lowercase().as_str() {
            "" | "na" | "nan" | "none" | "null" => None,
            _ => Some(raw),
        }
    }

    fn float(&self, idx: Option<usize>, name: &str) -> Result<Option<f64>> {
        match self.text(idx) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.malformed(format!("{name} value '{raw}' is not a number"))),
        }
    }

    fn position(&self, idx: usize, name: &str) -> Result<usize> {
        let raw = self
            .text(Some(idx))
            .ok_or_else(|| self.malformed(format!("{name} is empty")))?;
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= MAX_POSITION)
            .ok_or_else(|| self.malformed(format!("{name} value '{raw}' is not a position")))?;
        Ok(value as usize)
    }

    fn required_text(&self, idx: usize, name: &str) -> Result<&'a str> {
        self.text(Some(idx))
            .ok_or_else(|| self.malformed(format!("{name} is empty")))
    }
}

/// Largest sequence position accepted from a table.
const MAX_POSITION: f64 = u32::MAX as f64;

fn csv_reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| VlpimError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| VlpimError::Other(e.into()))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ── Binding predictions ──────────────────────────────────────────────────────

/// Long-format predictor output: one row per peptide and allele.
/// `sequence`, `start` and `allele` are required. A missing core falls back
/// to the peptide and a missing `seq_id` to [`PARENT_SEQ_ID`].
pub fn parse_binding_records(table: &str, content: &str) -> Result<Vec<BindingRecord>> {
    let mut reader = csv_reader(content);
    let header = Header::new(table, reader.headers()?);

    let peptide_idx = header.require(PEPTIDE_ALIASES)?;
    let start_idx = header.require(START_ALIASES)?;
    let allele_idx = header.require(ALLELE_ALIASES)?;
    let seq_id_idx = header.find(SEQ_ID_ALIASES);
    let core_idx = header.find(CORE_ALIASES);
    if core_idx.is_none() {
        debug!("{}: core column not found, using sequence as core", table);
    }
    let end_idx = header.find(END_ALIASES);
    let rank_el_idx = header.find(RANK_EL_ALIASES);
    let rank_ba_idx = header.find(RANK_BA_ALIASES);
    let ic50_idx = header.find(IC50_ALIASES);

    let mut records = Vec::new();
    for result in reader.records() {
        let raw = result?;
        let row = Row { table, record: &raw };
        let peptide = row.required_text(peptide_idx, "sequence")?.to_ascii_uppercase();
        let start = row.position(start_idx, "start")?;
        let allele = row.required_text(allele_idx, "allele")?;
        let seq_id = row.text(seq_id_idx).unwrap_or(PARENT_SEQ_ID);

        let mut record = BindingRecord::new(seq_id, &normalize_allele(allele), &peptide, start);
        if let Some(core) = row.text(core_idx) {
            record = record.with_core(&core.to_ascii_uppercase());
        }
        if let Some(idx) = end_idx {
            if row.text(Some(idx)).is_some() {
                let end = row.position(idx, "end")?;
                if end != record.end {
                    warn!(
                        "{} line {}: end {} disagrees with peptide length, using {}",
                        table,
                        row.line(),
                        end,
                        record.end
                    );
                }
            }
        }
        record.rank_el = row.float(rank_el_idx, "rank_el")?;
        record.rank_ba = row.float(rank_ba_idx, "rank_ba")?;
        record.ic50 = row.float(ic50_idx, "ic50")?;
        records.push(record);
    }
    debug!("Parsed {} binding records from {}", records.len(), table);
    Ok(records)
}

pub async fn load_binding_records(path: &Path) -> Result<Vec<BindingRecord>> {
    parse_binding_records(&table_name(path), &read_input(path).await?)
}

// ── Epitopes ─────────────────────────────────────────────────────────────────

/// User-supplied epitope list; `sequence`, `start` and `end` are required.
pub fn parse_user_epitopes(table: &str, content: &str) -> Result<Vec<Epitope>> {
    let mut reader = csv_reader(content);
    let header = Header::new(table, reader.headers()?);
    let sequence_idx = header.require(&[SEQUENCE])?;
    let start_idx = header.require(&[START])?;
    let end_idx = header.require(&[END])?;
    let core_idx = header.find(&[CORE]);
    let count_idx = header.find(&[NUMBER_OF_STRONG_BINDING]);

    let mut epitopes = Vec::new();
    for result in reader.records() {
        let raw = result?;
        let row = Row { table, record: &raw };
        let sequence = row.required_text(sequence_idx, SEQUENCE)?.to_ascii_uppercase();
        let start = row.position(start_idx, START)?;
        let end = row.position(end_idx, END)?;
        if start == 0 || end < start {
            return Err(row.malformed(format!("invalid region {start}-{end}")));
        }
        let core = row
            .text(core_idx)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| sequence.clone());
        let number_of_strong_binding = match count_idx {
            Some(idx) if row.text(Some(idx)).is_some() => row.position(idx, NUMBER_OF_STRONG_BINDING)?,
            _ => 0,
        };
        epitopes.push(Epitope {
            sequence,
            start,
            end,
            core,
            number_of_strong_binding,
        });
    }
    Ok(epitopes)
}

pub async fn load_user_epitopes(path: &Path) -> Result<Vec<Epitope>> {
    parse_user_epitopes(&table_name(path), &read_input(path).await?)
}

pub fn epitopes_to_csv(epitopes: &[Epitope]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([SEQUENCE, START, END, CORE, NUMBER_OF_STRONG_BINDING])?;
    for e in epitopes {
        writer.write_record([
            e.sequence.clone(),
            e.start.to_string(),
            e.end.to_string(),
            e.core.clone(),
            e.number_of_strong_binding.to_string(),
        ])?;
    }
    finish_csv(writer)
}

pub async fn write_epitopes(path: &Path, epitopes: &[Epitope]) -> Result<()> {
    write_output(path, epitopes_to_csv(epitopes)?).await
}

// ── Wide affinity tables ─────────────────────────────────────────────────────

/// One row per candidate with `IC50_<allele>` or `Rank_<allele>` columns.
/// A table without value columns loads with no alleles.
pub fn parse_affinity_table(table: &str, content: &str) -> Result<AffinityTable> {
    let mut reader = csv_reader(content);
    let header = Header::new(table, reader.headers()?);
    let id_idx = header.require(&[SEQUENCE_ID, "seq_id"])?;
    let sequence_idx = header.find(&[SEQUENCE]);

    let (kind, value_columns) = match AffinityColumn::select(header.names.as_slice()) {
        Some(found) => found,
        None => {
            warn!("{}: no IC50_* or Rank_* columns found", table);
            (vlpim_ranker::AffinityKind::Ic50, Vec::new())
        }
    };

    let mut affinity = AffinityTable::new(kind);
    for result in reader.records() {
        let raw = result?;
        let row = Row { table, record: &raw };
        let id = row.required_text(id_idx, SEQUENCE_ID)?;
        let mut values = BTreeMap::new();
        for (idx, allele) in &value_columns {
            if let Some(v) = row.float(Some(*idx), allele)? {
                values.insert(allele.clone(), v);
            }
        }
        let mut affinity_row = AffinityRow::new(id, values);
        affinity_row.sequence = row.text(sequence_idx).map(str::to_string);
        affinity.push_row(affinity_row);
    }
    for (_, allele) in &value_columns {
        if !affinity.alleles.contains(allele) {
            affinity.alleles.push(allele.clone());
        }
    }
    Ok(affinity)
}

pub async fn load_affinity_table(path: &Path) -> Result<AffinityTable> {
    parse_affinity_table(&table_name(path), &read_input(path).await?)
}

// ── Scored and ranked candidates ─────────────────────────────────────────────

/// Allele columns in first-seen order across all candidates.
fn score_alleles<'a>(candidates: impl Iterator<Item = &'a ScoredCandidate>) -> Vec<String> {
    let mut alleles: Vec<String> = Vec::new();
    for candidate in candidates {
        for allele in candidate.scores.keys() {
            if !alleles.contains(allele) {
                alleles.push(allele.clone());
            }
        }
    }
    alleles
}

fn candidate_cells(candidate: &ScoredCandidate, alleles: &[String]) -> Vec<String> {
    let mut cells = vec![
        candidate.sequence_id.clone(),
        candidate.sequence.clone().unwrap_or_default(),
    ];
    cells.extend(alleles.iter().map(|a| fmt_opt(candidate.scores.get(a).copied())));
    cells.push(fmt_opt(candidate.overall_score));
    cells
}

fn candidate_headers(alleles: &[String]) -> Vec<String> {
    let mut headers = vec![SEQUENCE_ID.to_string(), SEQUENCE.to_string()];
    headers.extend(alleles.iter().map(|a| columns::score_column(a)));
    headers.push(OVERALL_SCORE.to_string());
    headers
}

pub fn scored_to_csv(scored: &[ScoredCandidate]) -> Result<String> {
    let alleles = score_alleles(scored.iter());
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(candidate_headers(&alleles))?;
    for candidate in scored {
        writer.write_record(candidate_cells(candidate, &alleles))?;
    }
    finish_csv(writer)
}

pub async fn write_scored_candidates(path: &Path, scored: &[ScoredCandidate]) -> Result<()> {
    write_output(path, scored_to_csv(scored)?).await
}

pub fn ranked_to_csv(ranked: &[RankedCandidate]) -> Result<String> {
    let alleles = score_alleles(ranked.iter().map(|r| &r.candidate));
    let mut headers = candidate_headers(&alleles);
    headers.extend(
        [
            RMSD,
            DG_DSASA,
            PACKSTAT,
            BUNS,
            INTERFACE_SC,
            INTERFACE_AREA,
            INTERFACE_QUALITY,
            PASSES_FILTERS,
            STRUCTURE_PATH,
            RANK,
        ]
        .iter()
        .map(|h| h.to_string()),
    );

    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(&headers)?;
    for r in ranked {
        let m = &r.metrics;
        let mut cells = candidate_cells(&r.candidate, &alleles);
        cells.extend([
            fmt_opt(m.rmsd),
            fmt_opt(m.dg_dsasa),
            fmt_opt(m.packstat),
            fmt_opt(m.buns),
            fmt_opt(m.interface_sc),
            fmt_opt(m.interface_area),
            r.interface_quality.map(|q| q.to_string()).unwrap_or_default(),
            r.passes_filters.to_string(),
            m.structure_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            r.rank.to_string(),
        ]);
        writer.write_record(&cells)?;
    }
    finish_csv(writer)
}

pub async fn write_ranked_candidates(path: &Path, ranked: &[RankedCandidate]) -> Result<()> {
    write_output(path, ranked_to_csv(ranked)?).await
}

/// Candidates with whatever score and structural columns the table has.
/// Reads the scored table, the final ranked table, or a bare metrics table.
pub fn parse_evaluated_candidates(table: &str, content: &str) -> Result<Vec<EvaluatedCandidate>> {
    let mut reader = csv_reader(content);
    let header = Header::new(table, reader.headers()?);
    let id_idx = header.require(&[SEQUENCE_ID, "seq_id"])?;
    let sequence_idx = header.find(&[SEQUENCE]);
    let overall_idx = header.find(&[OVERALL_SCORE]);
    let score_columns: Vec<(usize, String)> = header
        .names
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.strip_prefix(SCORE_PREFIX).map(|a| (i, normalize_allele(a))))
        .collect();
    let rmsd_idx = header.find(&[RMSD]);
    let dg_idx = header.find(&[DG_DSASA, "dg_dsasa"]);
    let packstat_idx = header.find(&[PACKSTAT]);
    let buns_idx = header.find(&[BUNS]);
    let sc_idx = header.find(&[INTERFACE_SC]);
    let area_idx = header.find(&[INTERFACE_AREA]);
    let path_idx = header.find(&[STRUCTURE_PATH]);

    let mut candidates = Vec::new();
    for result in reader.records() {
        let raw = result?;
        let row = Row { table, record: &raw };
        let mut scores = BTreeMap::new();
        for (idx, allele) in &score_columns {
            if let Some(v) = row.float(Some(*idx), allele)? {
                scores.insert(allele.clone(), v);
            }
        }
        let candidate = ScoredCandidate {
            sequence_id: row.required_text(id_idx, SEQUENCE_ID)?.to_string(),
            sequence: row.text(sequence_idx).map(str::to_string),
            scores,
            overall_score: row.float(overall_idx, OVERALL_SCORE)?,
        };
        let metrics = StructuralMetrics {
            rmsd: row.float(rmsd_idx, RMSD)?,
            dg_dsasa: row.float(dg_idx, DG_DSASA)?,
            packstat: row.float(packstat_idx, PACKSTAT)?,
            buns: row.float(buns_idx, BUNS)?,
            interface_sc: row.float(sc_idx, INTERFACE_SC)?,
            interface_area: row.float(area_idx, INTERFACE_AREA)?,
            structure_path: row.text(path_idx).map(std::path::PathBuf::from),
        };
        candidates.push(EvaluatedCandidate { candidate, metrics });
    }
    Ok(candidates)
}

pub async fn load_evaluated_candidates(path: &Path) -> Result<Vec<EvaluatedCandidate>> {
    parse_evaluated_candidates(&table_name(path), &read_input(path).await?)
}
