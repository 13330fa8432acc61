use anyhow::Context;
use std::path::PathBuf;
use tracing::info;
use vlpim_common::PipelineConfig;

pub async fn execute(config: PipelineConfig, binding_table: PathBuf, fasta: PathBuf) -> anyhow::Result<()> {
    config.validate()?;
    let selection = vlpim_pipeline::analyze_epitopes(&binding_table, &fasta, &config)
        .await
        .context("epitope analysis failed")?;
    for epitope in &selection.epitopes {
        info!(
            "{} [{}-{}] core {} ({} binding alleles)",
            epitope.sequence, epitope.start, epitope.end, epitope.core, epitope.number_of_strong_binding
        );
    }
    Ok(())
}
