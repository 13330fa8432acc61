//! Pipeline orchestration: file formats, collaborator contracts and the
//! end-to-end immunogenicity modulation run.

pub mod analysis;
pub mod collaborators;
pub mod file_backed;
pub mod inputs;
pub mod io;
pub mod pipeline;
pub mod summary;

pub use analysis::{analyze_epitopes, score_affinity_file};
pub use collaborators::{
    BindingPredictor, CandidateSequence, GenerationRequest, InterfaceAnalyzer,
    MockBindingPredictor, MockInterfaceAnalyzer, MockSequenceGenerator, MockStructurePredictor,
    SequenceGenerator, StructurePrediction, StructurePredictor,
};
pub use file_backed::{FastaSequenceGenerator, TableBindingPredictor, TableStructureMetrics};
pub use inputs::PipelineInputs;
pub use pipeline::{mutant_id, Collaborators, ImmunogenicityPipeline, PipelineRun};
pub use summary::RunSummary;
