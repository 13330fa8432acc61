use anyhow::Context;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use vlpim_common::PipelineConfig;
use vlpim_pipeline::{
    Collaborators, FastaSequenceGenerator, ImmunogenicityPipeline, PipelineInputs,
    TableBindingPredictor, TableStructureMetrics,
};

pub struct RunFiles {
    pub fasta: PathBuf,
    pub pdb: PathBuf,
    pub epitopes: Option<PathBuf>,
    pub binding_table: PathBuf,
    pub candidates: PathBuf,
    pub structure_metrics: Option<PathBuf>,
}

pub async fn execute(config: PipelineConfig, files: RunFiles) -> anyhow::Result<()> {
    let binding = TableBindingPredictor::load(&files.binding_table)
        .await
        .with_context(|| format!("reading binding table {}", files.binding_table.display()))?;
    let generator = FastaSequenceGenerator::load(&files.candidates)
        .await
        .with_context(|| format!("reading candidates {}", files.candidates.display()))?;
    let metrics = match &files.structure_metrics {
        Some(path) => TableStructureMetrics::load(path)
            .await
            .with_context(|| format!("reading structure metrics {}", path.display()))?,
        None => {
            warn!("No structure metrics given, candidates will be ranked without structural data");
            TableStructureMetrics::new(HashMap::new())
        }
    };
    let metrics = Arc::new(metrics);

    let collaborators = Collaborators {
        binding: Arc::new(binding),
        generator: Arc::new(generator),
        structure: metrics.clone(),
        interface: metrics,
    };
    let pipeline = ImmunogenicityPipeline::new(config, collaborators)?;

    let mut inputs = PipelineInputs::new(files.fasta, files.pdb);
    if let Some(path) = files.epitopes {
        inputs = inputs.with_user_epitopes(path);
    }

    let run = pipeline.run(&inputs).await.context("pipeline run failed")?;
    info!(
        "Results in {:?}: {} ranked, {} passing filters, {} warnings",
        run.summary.output_dir,
        run.summary.ranked,
        run.summary.passing_filters,
        run.summary.warnings.len()
    );
    Ok(())
}
