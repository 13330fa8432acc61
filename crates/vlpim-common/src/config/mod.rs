//! Pipeline configuration.
//! Reads the file named in VLPIM_CONFIG, else vlpim.toml in the current directory,
//! else falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::alleles::default_panel;
use crate::error::{Result, VlpimError};
use crate::mode::ImmunogenicityMode;

#[cfg(test)]
mod tests;

pub const CONFIG_ENV_VAR: &str = "VLPIM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "vlpim.toml";

/// Full run configuration. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: ImmunogenicityMode,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Requested number of epitope cores
    #[serde(default = "default_epitopes_number")]
    pub epitopes_number: usize,

    /// Target epitope length after extension (9-15, otherwise 15)
    #[serde(default = "default_epitope_length")]
    pub epitope_length: usize,

    #[serde(default = "default_samples_per_temp")]
    pub samples_per_temp: usize,

    #[serde(default = "default_temperatures")]
    pub temperatures: Vec<f64>,

    #[serde(default = "default_panel")]
    pub hla_alleles: Vec<String>,

    /// Candidates forwarded to structure prediction
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    #[serde(default = "default_rmsd_threshold")]
    pub rmsd_threshold: f64,

    #[serde(default = "default_true")]
    pub interface_analysis: bool,

    #[serde(default = "default_dg_dsasa_threshold")]
    pub dg_dsasa_threshold: f64,

    #[serde(default = "default_buns_threshold")]
    pub buns_threshold: u32,

    #[serde(default = "default_packstat_threshold")]
    pub packstat_threshold: f64,

    /// Score given to every row of a constant allele column
    #[serde(default = "default_neutral_score")]
    pub neutral_score: f64,

    #[serde(default)]
    pub score_aggregation: ScoreAggregation,
}

fn default_output_dir() -> PathBuf { PathBuf::from("results") }
fn default_epitopes_number() -> usize { 10 }
fn default_epitope_length() -> usize { 15 }
fn default_samples_per_temp() -> usize { 20 }
fn default_temperatures() -> Vec<f64> { vec![0.1, 0.3, 0.5] }
fn default_max_candidates() -> usize { 10 }
fn default_rmsd_threshold() -> f64 { 2.0 }
fn default_true() -> bool { true }
fn default_dg_dsasa_threshold() -> f64 { -0.5 }
fn default_buns_threshold() -> u32 { 5 }
fn default_packstat_threshold() -> f64 { 0.6 }
fn default_neutral_score() -> f64 { 50.0 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ImmunogenicityMode::default(),
            output_dir: default_output_dir(),
            epitopes_number: default_epitopes_number(),
            epitope_length: default_epitope_length(),
            samples_per_temp: default_samples_per_temp(),
            temperatures: default_temperatures(),
            hla_alleles: default_panel(),
            max_candidates: default_max_candidates(),
            rmsd_threshold: default_rmsd_threshold(),
            interface_analysis: default_true(),
            dg_dsasa_threshold: default_dg_dsasa_threshold(),
            buns_threshold: default_buns_threshold(),
            packstat_threshold: default_packstat_threshold(),
            neutral_score: default_neutral_score(),
            score_aggregation: ScoreAggregation::default(),
        }
    }
}

// ── Stage views ──────────────────────────────────────────────────────────────

/// What the epitope selector and extender need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    pub mode: ImmunogenicityMode,
    pub epitopes_number: usize,
    pub epitope_length: usize,
}

/// What the immunogenicity scorer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub mode: ImmunogenicityMode,
    pub neutral_score: f64,
    pub aggregation: ScoreAggregation,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ImmunogenicityMode::default(),
            neutral_score: default_neutral_score(),
            aggregation: ScoreAggregation::default(),
        }
    }
}

/// Pass/fail limits applied to structurally evaluated candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    pub rmsd: f64,
    pub dg_dsasa: f64,
    pub buns: f64,
    pub packstat: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            rmsd: default_rmsd_threshold(),
            dg_dsasa: default_dg_dsasa_threshold(),
            buns: default_buns_threshold() as f64,
            packstat: default_packstat_threshold(),
        }
    }
}

/// How per-allele scores collapse into one overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoreAggregation {
    #[default]
    Mean,
    Sum,
}

impl fmt::Display for ScoreAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => f.write_str("mean"),
            Self::Sum => f.write_str("sum"),
        }
    }
}

impl FromStr for ScoreAggregation {
    type Err = VlpimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            other => Err(VlpimError::Config(format!(
                "unknown score aggregation '{other}', expected 'mean' or 'sum'"
            ))),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl PipelineConfig {
    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            mode: self.mode,
            epitopes_number: self.epitopes_number,
            epitope_length: self.epitope_length,
        }
    }

    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            mode: self.mode,
            neutral_score: self.neutral_score,
            aggregation: self.score_aggregation,
        }
    }

    pub fn thresholds(&self) -> FilterThresholds {
        FilterThresholds {
            rmsd: self.rmsd_threshold,
            dg_dsasa: self.dg_dsasa_threshold,
            buns: self.buns_threshold as f64,
            packstat: self.packstat_threshold,
        }
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a config file, picking the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VlpimError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("toml") => Self::from_toml(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(VlpimError::InvalidExtension {
                path: path.to_path_buf(),
                expected: ".toml, .yaml, .yml or .json".to_string(),
            }),
        }
    }

    /// Checks VLPIM_CONFIG first, then the current directory. A missing
    /// default file yields the built-in defaults; a missing explicit one is an error.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_path(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject values no stage can work with. Epitope length is not checked
    /// here because the extender clamps it.
    pub fn validate(&self) -> Result<()> {
        if self.epitopes_number == 0 {
            return Err(VlpimError::Config("epitopes_number must be at least 1".into()));
        }
        if self.max_candidates == 0 {
            return Err(VlpimError::Config("max_candidates must be at least 1".into()));
        }
        if self.hla_alleles.is_empty() {
            return Err(VlpimError::Config("hla_alleles must not be empty".into()));
        }
        if self.temperatures.is_empty() {
            return Err(VlpimError::Config("temperatures must not be empty".into()));
        }
        if self.samples_per_temp == 0 {
            return Err(VlpimError::Config("samples_per_temp must be at least 1".into()));
        }
        if !(self.neutral_score.is_finite() && (0.0..=100.0).contains(&self.neutral_score)) {
            return Err(VlpimError::Config(format!(
                "neutral_score must lie in [0, 100], got {}",
                self.neutral_score
            )));
        }
        Ok(())
    }
}
