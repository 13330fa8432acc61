use anyhow::Context;
use std::path::PathBuf;
use tracing::info;
use vlpim_common::PipelineConfig;
use vlpim_pipeline::io;
use vlpim_ranker::CandidateRanker;

pub async fn execute(config: PipelineConfig, table: PathBuf, out: PathBuf) -> anyhow::Result<()> {
    let evaluated = io::load_evaluated_candidates(&table)
        .await
        .with_context(|| format!("reading evaluated candidates {}", table.display()))?;
    let ranked = CandidateRanker::new(config.thresholds()).rank(evaluated);
    io::write_ranked_candidates(&out, &ranked).await?;
    info!(
        "Wrote {} ranked candidates ({} passing filters) to {:?}",
        ranked.len(),
        ranked.iter().filter(|r| r.passes_filters).count(),
        out
    );
    Ok(())
}
