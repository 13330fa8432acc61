pub mod config;
pub mod epitopes;
pub mod rank;
pub mod run;
pub mod score;

use anyhow::Context;
use std::path::Path;
use vlpim_common::PipelineConfig;

/// An explicit `--config` file, else the default lookup.
pub fn resolve_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => PipelineConfig::load().context("loading configuration"),
    }
}
