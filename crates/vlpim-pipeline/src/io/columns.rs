//! Column names shared with downstream consumers. These are written verbatim.

pub const SEQUENCE: &str = "sequence";
pub const START: &str = "start";
pub const END: &str = "end";
pub const CORE: &str = "core";
pub const NUMBER_OF_STRONG_BINDING: &str = "number_of_strong_binding";

pub const SEQUENCE_ID: &str = "sequence_id";
pub const SCORE_PREFIX: &str = "Score_";
pub const OVERALL_SCORE: &str = "Overall_Immunogenicity_Score";

pub const RMSD: &str = "RMSD";
pub const DG_DSASA: &str = "dG_dSASA";
pub const PACKSTAT: &str = "packstat";
pub const BUNS: &str = "BUNS";
pub const INTERFACE_SC: &str = "interface_sc";
pub const INTERFACE_AREA: &str = "interface_area";
pub const INTERFACE_QUALITY: &str = "Interface_Quality";
pub const PASSES_FILTERS: &str = "Passes_Filters";
pub const STRUCTURE_PATH: &str = "structure_path";
pub const RANK: &str = "Rank";

// Accepted spellings when reading predictor output, lower-cased.
pub(crate) const SEQ_ID_ALIASES: &[&str] = &["seq_id", "sequence_id", "identity", "id"];
pub(crate) const ALLELE_ALIASES: &[&str] = &["allele", "mhc", "hla"];
pub(crate) const PEPTIDE_ALIASES: &[&str] = &["sequence", "peptide"];
pub(crate) const CORE_ALIASES: &[&str] = &["core", "core_sequence", "of_core"];
pub(crate) const START_ALIASES: &[&str] = &["start", "pos"];
pub(crate) const END_ALIASES: &[&str] = &["end"];
pub(crate) const RANK_EL_ALIASES: &[&str] = &["rank_el", "%rank_el", "el_rank"];
pub(crate) const RANK_BA_ALIASES: &[&str] = &["rank_ba", "%rank_ba", "ba_rank", "rank"];
pub(crate) const IC50_ALIASES: &[&str] = &["ic50", "ic50_nm", "affinity(nm)", "affinity_nm"];

pub fn score_column(allele: &str) -> String {
    format!("{SCORE_PREFIX}{allele}")
}
