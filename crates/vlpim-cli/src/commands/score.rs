use anyhow::Context;
use std::path::PathBuf;
use vlpim_common::PipelineConfig;

pub async fn execute(config: PipelineConfig, table: PathBuf, out: PathBuf) -> anyhow::Result<()> {
    vlpim_pipeline::score_affinity_file(&table, &out, &config.scoring())
        .await
        .with_context(|| format!("scoring affinity table {}", table.display()))?;
    Ok(())
}
