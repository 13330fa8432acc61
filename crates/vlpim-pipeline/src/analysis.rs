//! Standalone stages over existing tables: epitope analysis of a
//! binding-prediction table and scoring of a wide affinity table.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vlpim_common::{
    ImmunogenicityMode, PipelineConfig, Result, ScoredCandidate, ScoringConfig, VlpimError,
};
use vlpim_epitope::{select_epitopes, EpitopeSelection};
use vlpim_ranker::ImmunogenicityScorer;

use crate::inputs::check_input;
use crate::io;

pub const ANALYSIS_CONFIG_FILE: &str = "analysis_config.json";
pub const SELECTED_EPITOPES_FILE: &str = "selected_epitopes.csv";

#[derive(Debug, Serialize)]
struct AnalysisConfig<'a> {
    binding_table: &'a Path,
    fasta: &'a Path,
    mode: ImmunogenicityMode,
    epitopes_number: usize,
    epitope_length: usize,
    output_dir: &'a Path,
}

/// Select and extend epitopes from `binding_table` against the parent in
/// `fasta`, writing the parameters and the selection to `config.output_dir`.
pub async fn analyze_epitopes(
    binding_table: &Path,
    fasta: &Path,
    config: &PipelineConfig,
) -> Result<EpitopeSelection> {
    check_input(binding_table, &["csv"])?;
    check_input(fasta, &["fasta", "fa"])?;

    let output_dir: PathBuf = config.output_dir.clone();
    tokio::fs::create_dir_all(&output_dir).await?;
    let params = AnalysisConfig {
        binding_table,
        fasta,
        mode: config.mode,
        epitopes_number: config.epitopes_number,
        epitope_length: config.epitope_length,
        output_dir: &output_dir,
    };
    io::write_output(
        &output_dir.join(ANALYSIS_CONFIG_FILE),
        serde_json::to_string_pretty(&params)?,
    )
    .await?;

    let (_, parent) = io::load_parent(fasta).await?;
    let records = io::load_binding_records(binding_table).await?;
    if records.is_empty() {
        return Err(VlpimError::no_usable_data("no epitopes found in binding predictions"));
    }

    let selection = select_epitopes(&records, &parent, &config.selection());
    if selection.epitopes.is_empty() {
        return Err(VlpimError::no_usable_data("no epitopes available"));
    }

    io::write_epitopes(&output_dir.join(SELECTED_EPITOPES_FILE), &selection.epitopes).await?;
    info!(
        "Epitope analysis complete: {} epitopes written to {:?}",
        selection.epitopes.len(),
        output_dir
    );
    Ok(selection)
}

/// Score the wide table at `table` and write it to `out` with score
/// columns. A table without `IC50_*`/`Rank_*` columns is copied unchanged.
pub async fn score_affinity_file(
    table: &Path,
    out: &Path,
    config: &ScoringConfig,
) -> Result<Vec<ScoredCandidate>> {
    let affinity = io::load_affinity_table(table).await?;
    if affinity.alleles.is_empty() {
        warn!("{:?} has no value columns, writing it unchanged", table);
        io::write_output(out, tokio::fs::read_to_string(table).await?).await?;
        return Ok(Vec::new());
    }
    let scored = ImmunogenicityScorer::new(*config).score(&affinity);
    io::write_scored_candidates(out, &scored).await?;
    info!("Wrote {} scored candidates to {:?}", scored.len(), out);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_writes_selection() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = write(
            dir.path(),
            "parent.fasta",
            ">parent\nMKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQAPILSRVGDGTQDNLSGAEKAVQVKVKALPDAQ\n",
        );
        let table = write(
            dir.path(),
            "binding.csv",
            "allele,seq_id,start,end,peptide,core,rank_el\n\
             DRB1*01:01,parent,1,15,MKTAYIAKQRQISFV,YIAKQRQIS,0.4\n\
             DRB1*03:01,parent,1,15,MKTAYIAKQRQISFV,YIAKQRQIS,0.8\n\
             DRB1*01:01,parent,30,44,IEVQAPILSRVGDGT,VQAPILSRV,12.0\n",
        );
        let config = PipelineConfig {
            output_dir: dir.path().join("out"),
            ..Default::default()
        };

        let selection = analyze_epitopes(&table, &fasta, &config).await.unwrap();
        assert_eq!(selection.epitopes[0].core, "YIAKQRQIS");
        assert_eq!(selection.epitopes[0].number_of_strong_binding, 2);
        assert!(dir.path().join("out").join(SELECTED_EPITOPES_FILE).exists());

        let params = std::fs::read_to_string(dir.path().join("out").join(ANALYSIS_CONFIG_FILE)).unwrap();
        assert!(params.contains("\"mode\": \"reduce\""));
    }

    #[tokio::test]
    async fn test_analyze_empty_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = write(dir.path(), "parent.fa", ">p\nMKTAYIAKQR\n");
        let table = write(dir.path(), "binding.csv", "allele,start,peptide\n");
        let config = PipelineConfig {
            output_dir: dir.path().join("out"),
            ..Default::default()
        };

        let err = analyze_epitopes(&table, &fasta, &config).await.unwrap_err();
        assert!(matches!(err, VlpimError::NoUsableData { .. }));
    }

    #[tokio::test]
    async fn test_score_file_adds_score_columns() {
        let dir = tempfile::tempdir().unwrap();
        let table = write(
            dir.path(),
            "wide.csv",
            "sequence_id,IC50_DRB1*01:01\nseq1,25\nseq2,400\n",
        );
        let out = dir.path().join("scored.csv");

        let scored = score_affinity_file(&table, &out, &ScoringConfig::default()).await.unwrap();
        assert_eq!(scored.len(), 2);
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.lines().next().unwrap().ends_with("Overall_Immunogenicity_Score"));
    }

    #[tokio::test]
    async fn test_score_file_without_value_columns_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let content = "sequence_id,sequence\nseq1,MKTAY\n";
        let table = write(dir.path(), "bare.csv", content);
        let out = dir.path().join("scored.csv");

        let scored = score_affinity_file(&table, &out, &ScoringConfig::default()).await.unwrap();
        assert!(scored.is_empty());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), content);
    }
}
