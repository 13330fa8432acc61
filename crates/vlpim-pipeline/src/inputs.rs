//! Run inputs and their up-front validation.

use std::path::{Path, PathBuf};
use vlpim_common::{Result, VlpimError};

/// Files a pipeline run starts from.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub fasta: PathBuf,
    /// Reference structure of the parent
    pub structure: PathBuf,
    /// Epitope list that replaces prediction
    pub user_epitopes: Option<PathBuf>,
}

impl PipelineInputs {
    pub fn new(fasta: impl Into<PathBuf>, structure: impl Into<PathBuf>) -> Self {
        Self {
            fasta: fasta.into(),
            structure: structure.into(),
            user_epitopes: None,
        }
    }

    pub fn with_user_epitopes(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_epitopes = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_input(&self.fasta, &["fasta", "fa"])?;
        check_input(&self.structure, &["pdb"])?;
        if let Some(path) = &self.user_epitopes {
            check_input(path, &["csv"])?;
        }
        Ok(())
    }
}

/// The file must exist and carry one of `extensions` (case-insensitive).
pub fn check_input(path: &Path, extensions: &[&str]) -> Result<()> {
    if !path.exists() {
        return Err(VlpimError::MissingInput(path.to_path_buf()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !extensions.contains(&ext.as_str()) {
        return Err(VlpimError::InvalidExtension {
            path: path.to_path_buf(),
            expected: extensions
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(" or "),
        });
    }
    Ok(())
}
