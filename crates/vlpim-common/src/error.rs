use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VlpimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Unsupported file extension for {}: expected {expected}", path.display())]
    InvalidExtension { path: PathBuf, expected: String },

    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Malformed row {line} in '{table}': {message}")]
    MalformedRow { table: String, line: u64, message: String },

    /// A stage finished without producing anything the next stage can use.
    #[error("No usable data: {stage}")]
    NoUsableData { stage: String },

    #[error("Invalid protein sequence: {0}")]
    InvalidSequence(String),

    #[error("Region {start}-{end} lies outside a parent sequence of length {parent_len}")]
    InvalidRegion { start: usize, end: usize, parent_len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{stage} failed: {message}")]
    Collaborator { stage: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VlpimError {
    pub fn no_usable_data(stage: impl Into<String>) -> Self {
        Self::NoUsableData { stage: stage.into() }
    }

    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn collaborator(stage: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            stage: stage.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VlpimError>;
