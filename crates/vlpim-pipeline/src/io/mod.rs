//! Tabular and FASTA artifacts.
//!
//! Parsers take the file content as a string and loaders wrap them with
//! `tokio::fs`, so the formats are testable without touching disk.

pub mod columns;
pub mod fasta;
pub mod tables;

pub use fasta::{load_fasta, load_parent, parse_fasta, to_fasta_string, write_fasta, FastaRecord};
pub use tables::{
    epitopes_to_csv, load_affinity_table, load_binding_records, load_evaluated_candidates,
    load_user_epitopes, parse_affinity_table, parse_binding_records, parse_evaluated_candidates,
    parse_user_epitopes, ranked_to_csv, scored_to_csv, write_epitopes, write_ranked_candidates, write_scored_candidates,
};

use std::path::Path;
use vlpim_common::{Result, VlpimError};

pub(crate) async fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(VlpimError::MissingInput(path.to_path_buf()));
    }
    Ok(tokio::fs::read_to_string(path).await?)
}

pub(crate) async fn write_output(path: &Path, content: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
