//! End-to-end immunogenicity modulation run.
//!
//! Steps:
//!   1. Validate inputs and load the parent sequence
//!   2. Identify epitopes (prediction + selection, or a user list)
//!   3. Generate mutants under the mode's design constraints
//!   4. Predict MHC-II binding for every mutant and score the batch
//!   5. Pre-select the best-scoring candidates
//!   6. Predict structures and analyse interfaces per candidate
//!   7. Rank by structural quality and write the final table
//!
//! Stages 2-5 abort the run when they produce nothing. Stage 6 tolerates
//! per-candidate failures: the candidate is kept with missing metrics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use vlpim_common::{
    normalize_allele, Epitope, EvaluatedCandidate, PipelineConfig, ProteinSequence,
    RankedCandidate, Result, ScoredCandidate, StructuralMetrics, VlpimError,
};
use vlpim_epitope::{fixed_positions, select_epitopes};
use vlpim_ranker::{select_top_candidates, AffinityTable, CandidateRanker, ImmunogenicityScorer};

use crate::collaborators::{
    BindingPredictor, CandidateSequence, GenerationRequest, InterfaceAnalyzer, SequenceGenerator,
    StructurePredictor,
};
use crate::inputs::PipelineInputs;
use crate::io::{self, tables::PARENT_SEQ_ID, FastaRecord};
use crate::summary::RunSummary;

// ── Artifact names ──────────────────────────────────────────────────────────

pub const CONFIG_FILE: &str = "config.json";
pub const EPITOPES_FILE: &str = "epitope_predictions.csv";
pub const MUTANTS_FILE: &str = "mutant_sequences.fasta";
pub const SCORES_FILE: &str = "mhc_binding_scores.csv";
pub const RANKED_FILE: &str = "final_ranked_candidates.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Id assigned to the `index`-th generated mutant.
pub fn mutant_id(index: usize) -> String {
    format!("mutant_{index:04}")
}

// ── Collaborators ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Collaborators {
    pub binding: Arc<dyn BindingPredictor>,
    pub generator: Arc<dyn SequenceGenerator>,
    pub structure: Arc<dyn StructurePredictor>,
    pub interface: Arc<dyn InterfaceAnalyzer>,
}

// ── Run output ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub summary: RunSummary,
    pub epitopes: Vec<Epitope>,
    pub mutants: Vec<CandidateSequence>,
    pub scored: Vec<ScoredCandidate>,
    pub ranked: Vec<RankedCandidate>,
}

// ── Pipeline ────────────────────────────────────────────────────────────────

pub struct ImmunogenicityPipeline {
    config: PipelineConfig,
    collaborators: Collaborators,
}

impl ImmunogenicityPipeline {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            collaborators,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Configured alleles in the form predictors report them.
    fn panel(&self) -> Vec<String> {
        self.config.hla_alleles.iter().map(|a| normalize_allele(a)).collect()
    }

    fn artifact(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    #[instrument(skip(self, inputs), fields(mode = %self.config.mode))]
    pub async fn run(&self, inputs: &PipelineInputs) -> Result<PipelineRun> {
        let timer = Instant::now();
        let mut summary = RunSummary::start(self.config.mode, self.config.output_dir.clone());
        info!(run_id = %summary.run_id, "Starting immunogenicity optimization pipeline");

        // 1. Inputs
        inputs.validate()?;
        let (parent_id, parent) = io::load_parent(&inputs.fasta).await?;
        info!("Loaded parent {} ({} residues)", parent_id, parent.len());

        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        io::write_output(&self.artifact(CONFIG_FILE), self.config.to_json()?).await?;

        // 2. Epitopes
        let epitopes = self.identify_epitopes(inputs, &parent).await?;
        summary.epitopes = epitopes.len();
        io::write_epitopes(&self.artifact(EPITOPES_FILE), &epitopes).await?;

        // 3. Mutants
        let mutants = self.generate_mutants(inputs, &parent, &epitopes).await?;
        summary.mutants = mutants.len();
        let fasta: Vec<FastaRecord> = mutants
            .iter()
            .map(|m| FastaRecord::new(m.id.clone(), m.sequence.clone()))
            .collect();
        io::write_fasta(&self.artifact(MUTANTS_FILE), &fasta).await?;

        // 4. Binding and score
        let scored = self.score_mutants(&mutants).await?;
        summary.scored = scored.len();
        io::write_scored_candidates(&self.artifact(SCORES_FILE), &scored).await?;

        // 5. Pre-selection
        let selected = select_top_candidates(&scored, self.config.max_candidates);
        if selected.is_empty() {
            return Err(VlpimError::no_usable_data("no candidates selected for structure prediction"));
        }
        summary.structure_candidates = selected.len();
        info!("Selected {} candidates for structure prediction", selected.len());

        // 6. Structure and interface
        let evaluated = self
            .evaluate_structures(selected, &inputs.structure, &mut summary.warnings)
            .await;

        // 7. Ranking
        let ranked = CandidateRanker::new(self.config.thresholds()).rank(evaluated);
        summary.ranked = ranked.len();
        summary.passing_filters = ranked.iter().filter(|r| r.passes_filters).count();
        io::write_ranked_candidates(&self.artifact(RANKED_FILE), &ranked).await?;

        summary.finish();
        io::write_output(
            &self.artifact(SUMMARY_FILE),
            serde_json::to_string_pretty(&summary)?,
        )
        .await?;

        info!(
            "Pipeline complete: {} ranked candidates, {} passing filters ({}ms)",
            summary.ranked,
            summary.passing_filters,
            timer.elapsed().as_millis()
        );

        Ok(PipelineRun {
            summary,
            epitopes,
            mutants,
            scored,
            ranked,
        })
    }

    async fn identify_epitopes(
        &self,
        inputs: &PipelineInputs,
        parent: &ProteinSequence,
    ) -> Result<Vec<Epitope>> {
        let epitopes = match &inputs.user_epitopes {
            Some(path) => {
                let epitopes = io::load_user_epitopes(path).await?;
                for epitope in &epitopes {
                    if epitope.start == 0 || epitope.start > epitope.end || epitope.end > parent.len() {
                        return Err(VlpimError::InvalidRegion {
                            start: epitope.start,
                            end: epitope.end,
                            parent_len: parent.len(),
                        });
                    }
                }
                info!("Using {} user-provided epitopes from {:?}", epitopes.len(), path);
                epitopes
            }
            None => {
                let candidate = CandidateSequence::new(PARENT_SEQ_ID, parent.as_str());
                let records = self
                    .collaborators
                    .binding
                    .predict(std::slice::from_ref(&candidate), &self.panel())
                    .await?;
                info!("Received {} binding predictions for the parent", records.len());
                select_epitopes(&records, parent, &self.config.selection()).epitopes
            }
        };

        if epitopes.is_empty() {
            return Err(VlpimError::no_usable_data("no epitopes available"));
        }
        Ok(epitopes)
    }

    async fn generate_mutants(
        &self,
        inputs: &PipelineInputs,
        parent: &ProteinSequence,
        epitopes: &[Epitope],
    ) -> Result<Vec<CandidateSequence>> {
        let request = GenerationRequest {
            parent: parent.clone(),
            structure_path: inputs.structure.clone(),
            epitopes: epitopes.to_vec(),
            mode: self.config.mode,
            fixed_positions: fixed_positions(epitopes, self.config.mode),
            samples_per_temp: self.config.samples_per_temp,
            temperatures: self.config.temperatures.clone(),
        };
        info!(
            "Generating mutants: {} fixed positions, {} samples x {} temperatures",
            request.fixed_positions.len(),
            request.samples_per_temp,
            request.temperatures.len()
        );

        let generated = self.collaborators.generator.generate(&request).await?;
        let mut mutants = Vec::with_capacity(generated.len());
        for raw in generated {
            match ProteinSequence::new(&raw) {
                Ok(seq) => mutants.push(CandidateSequence::new(mutant_id(mutants.len()), seq.as_str())),
                Err(e) => warn!("Discarding generated sequence: {}", e),
            }
        }

        if mutants.is_empty() {
            return Err(VlpimError::no_usable_data("no mutant sequences generated"));
        }
        info!("Generated {} mutant sequences", mutants.len());
        Ok(mutants)
    }

    async fn score_mutants(&self, mutants: &[CandidateSequence]) -> Result<Vec<ScoredCandidate>> {
        let records = self
            .collaborators
            .binding
            .predict(mutants, &self.panel())
            .await?;
        if records.is_empty() {
            return Err(VlpimError::no_usable_data("no MHC-II binding results obtained"));
        }

        let sequences: HashMap<String, String> = mutants
            .iter()
            .map(|m| (m.id.clone(), m.sequence.clone()))
            .collect();
        let table = AffinityTable::from_records(&records).with_sequences(&sequences);
        info!(
            "Scoring {} candidates across {} alleles",
            table.len(),
            table.alleles.len()
        );
        Ok(ImmunogenicityScorer::new(self.config.scoring()).score(&table))
    }

    async fn evaluate_structures(
        &self,
        selected: Vec<ScoredCandidate>,
        reference: &Path,
        warnings: &mut Vec<String>,
    ) -> Vec<EvaluatedCandidate> {
        let mut evaluated = Vec::with_capacity(selected.len());
        for candidate in selected {
            let sequence = CandidateSequence::new(
                candidate.sequence_id.clone(),
                candidate.sequence.clone().unwrap_or_default(),
            );
            let mut metrics = StructuralMetrics::default();

            match self.collaborators.structure.predict(&sequence, reference).await {
                Ok(prediction) => {
                    metrics.rmsd = prediction.rmsd;
                    if self.config.interface_analysis {
                        match self
                            .collaborators
                            .interface
                            .analyze(&sequence.id, &prediction.structure_path)
                            .await
                        {
                            Ok(interface) => metrics = metrics.with_interface(&interface),
                            Err(e) => {
                                warn!("Interface analysis failed for {}: {}", sequence.id, e);
                                warnings.push(format!("interface analysis failed for {}: {e}", sequence.id));
                            }
                        }
                    }
                    metrics.structure_path = Some(prediction.structure_path);
                }
                Err(e) => {
                    warn!("Structure prediction failed for {}: {}", sequence.id, e);
                    warnings.push(format!("structure prediction failed for {}: {e}", sequence.id));
                }
            }

            evaluated.push(EvaluatedCandidate { candidate, metrics });
        }
        evaluated
    }
}
