//! Full pipeline runs against mock collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use vlpim_common::{
    BindingRecord, ImmunogenicityMode, InterfaceMetrics, PipelineConfig, VlpimError,
};
use vlpim_pipeline::pipeline::{
    CONFIG_FILE, EPITOPES_FILE, MUTANTS_FILE, RANKED_FILE, SCORES_FILE, SUMMARY_FILE,
};
use vlpim_pipeline::{
    Collaborators, ImmunogenicityPipeline, MockBindingPredictor, MockInterfaceAnalyzer,
    MockSequenceGenerator, MockStructurePredictor, PipelineInputs,
};

const PARENT: &str = "MKTAYIAKQRQISFVKSHFSRQLEERLGLIEVQAPILSRVGDGTQDNLSGAEKAVQVKVKALPDAQ";
const A1: &str = "DRB1*01:01";
const A2: &str = "DRB1*03:01";
const A3: &str = "DRB1*04:01";

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::write(root.join("vlp.fasta"), format!(">vlp\n{PARENT}\n")).unwrap();
        std::fs::write(root.join("vlp.pdb"), "ATOM\n").unwrap();
        Self { _dir: dir, root }
    }

    fn inputs(&self) -> PipelineInputs {
        PipelineInputs::new(self.root.join("vlp.fasta"), self.root.join("vlp.pdb"))
    }

    fn out(&self) -> PathBuf {
        self.root.join("results")
    }

    fn config(&self, mode: ImmunogenicityMode) -> PipelineConfig {
        PipelineConfig {
            mode,
            output_dir: self.out(),
            max_candidates: 3,
            hla_alleles: vec![A1.into(), "HLA-DRB1*0301".into(), A3.into()],
            ..Default::default()
        }
    }
}

/// Parent predictions: YIAKQRQIS (positions 5-13, extended to 3-17) binds
/// strongly to three alleles, VQAPILSRV (32-40, extended to 30-44) to one.
fn parent_records() -> Vec<BindingRecord> {
    let strong = [A1, A2, A3].map(|a| {
        BindingRecord::new("parent", a, "MKTAYIAKQRQISFV", 1)
            .with_core("YIAKQRQIS")
            .with_rank_el(0.4)
    });
    let weak = [
        BindingRecord::new("parent", A1, "IEVQAPILSRVGDGT", 30)
            .with_core("VQAPILSRV")
            .with_rank_el(0.7),
        BindingRecord::new("parent", A2, "IEVQAPILSRVGDGT", 30)
            .with_core("VQAPILSRV")
            .with_rank_el(20.0),
    ];
    strong.into_iter().chain(weak).collect()
}

fn mutant(substitution_at: usize, residue: char) -> String {
    let mut seq: Vec<char> = PARENT.chars().collect();
    seq[substitution_at - 1] = residue;
    seq.into_iter().collect()
}

/// mutant_0000 binds strongest, mutant_0003 weakest.
fn mutant_records() -> Vec<BindingRecord> {
    let ic50 = [(25.0, 30.0), (150.0, 180.0), (400.0, 420.0), (1000.0, 900.0)];
    ic50.iter()
        .enumerate()
        .flat_map(|(i, (a1, a2))| {
            let id = format!("mutant_{i:04}");
            [
                BindingRecord::new(&id, A1, "MKTAYIAKQ", 1).with_ic50(*a1),
                BindingRecord::new(&id, A2, "MKTAYIAKQ", 1).with_ic50(*a2),
            ]
        })
        .collect()
}

fn generator() -> MockSequenceGenerator {
    MockSequenceGenerator::new()
        .with(&mutant(20, 'A'))
        .with(&mutant(45, 'K'))
        .with(&mutant(50, 'E'))
        .with(&mutant(60, 'R'))
}

fn collaborators(generator: Arc<MockSequenceGenerator>) -> Collaborators {
    Collaborators {
        binding: Arc::new(
            MockBindingPredictor::new()
                .with_records(parent_records())
                .with_records(mutant_records()),
        ),
        generator,
        structure: Arc::new(
            MockStructurePredictor::new()
                .with("mutant_0000", 1.5)
                .with("mutant_0002", 0.8)
                .with("mutant_0003", 1.2),
        ),
        interface: Arc::new(
            MockInterfaceAnalyzer::new()
                .with("mutant_0000", InterfaceMetrics::new(-2.0, 0.62, 4.0))
                .with("mutant_0002", InterfaceMetrics::new(-3.0, 0.65, 3.0))
                .with("mutant_0003", InterfaceMetrics::new(-8.0, 0.72, 1.0)),
        ),
    }
}

fn ids(run: &vlpim_pipeline::PipelineRun) -> Vec<&str> {
    run.ranked.iter().map(|r| r.candidate.sequence_id.as_str()).collect()
}

fn exists(dir: &Path, name: &str) -> bool {
    dir.join(name).exists()
}

#[tokio::test]
async fn test_reduce_run_ranks_weak_binders() {
    let ws = Workspace::new();
    let generator = Arc::new(generator());
    let pipeline = ImmunogenicityPipeline::new(
        ws.config(ImmunogenicityMode::Reduce),
        collaborators(generator.clone()),
    )
    .unwrap();

    let run = pipeline.run(&ws.inputs()).await.unwrap();

    // 66 residues caps selection at three cores; both binding cores survive.
    assert_eq!(run.epitopes.len(), 2);
    assert_eq!(run.epitopes[0].core, "YIAKQRQIS");
    assert_eq!(run.epitopes[0].number_of_strong_binding, 3);
    assert_eq!(run.epitopes[0].len(), 15);

    let request = generator.last_request().unwrap();
    assert_eq!(request.mode, ImmunogenicityMode::Reduce);
    assert_eq!(
        request.fixed_positions,
        (3..=17).chain(30..=44).collect::<Vec<_>>()
    );

    assert_eq!(run.mutants.len(), 4);
    assert_eq!(run.mutants[3].id, "mutant_0003");

    // Weakest binders score lowest under reduce.
    let m3 = run.scored.iter().find(|s| s.sequence_id == "mutant_0003").unwrap();
    assert_eq!(m3.overall_score, Some(0.0));
    let m0 = run.scored.iter().find(|s| s.sequence_id == "mutant_0000").unwrap();
    assert_eq!(m0.overall_score, Some(100.0));

    // mutant_0001 has no model: kept, metrics missing, sorted last.
    assert_eq!(ids(&run), vec!["mutant_0002", "mutant_0003", "mutant_0001"]);
    assert_eq!(run.ranked[0].rank, 1);
    assert!(run.ranked[0].passes_filters);
    assert!(run.ranked[1].passes_filters);
    assert!(!run.ranked[2].passes_filters);
    assert!(run.ranked[2].metrics.rmsd.is_none());

    assert_eq!(run.summary.structure_candidates, 3);
    assert_eq!(run.summary.passing_filters, 2);
    assert_eq!(run.summary.warnings.len(), 1);
    assert!(run.summary.warnings[0].contains("mutant_0001"));

    for name in [CONFIG_FILE, EPITOPES_FILE, MUTANTS_FILE, SCORES_FILE, RANKED_FILE, SUMMARY_FILE] {
        assert!(exists(&ws.out(), name), "missing {name}");
    }
    let ranked_csv = std::fs::read_to_string(ws.out().join(RANKED_FILE)).unwrap();
    assert!(ranked_csv.lines().next().unwrap().contains("Passes_Filters"));
    assert_eq!(ranked_csv.lines().count(), 4);
}

#[tokio::test]
async fn test_enhance_run_prefers_strong_binders() {
    let ws = Workspace::new();
    let generator = Arc::new(generator());
    let pipeline = ImmunogenicityPipeline::new(
        ws.config(ImmunogenicityMode::Enhance),
        collaborators(generator.clone()),
    )
    .unwrap();

    let run = pipeline.run(&ws.inputs()).await.unwrap();

    assert!(generator.last_request().unwrap().fixed_positions.is_empty());
    let selected: Vec<&str> = run
        .ranked
        .iter()
        .map(|r| r.candidate.sequence_id.as_str())
        .collect();
    assert!(selected.contains(&"mutant_0000"));
    assert!(!selected.contains(&"mutant_0003"));
    assert_eq!(run.ranked[0].candidate.sequence_id, "mutant_0002");
}

#[tokio::test]
async fn test_user_epitopes_replace_prediction() {
    let ws = Workspace::new();
    let epitopes = ws.root.join("epitopes.csv");
    std::fs::write(&epitopes, "sequence,start,end\nSHFSRQLEE,17,25\n").unwrap();

    let generator = Arc::new(generator());
    let pipeline = ImmunogenicityPipeline::new(
        ws.config(ImmunogenicityMode::Reduce),
        collaborators(generator.clone()),
    )
    .unwrap();
    let run = pipeline
        .run(&ws.inputs().with_user_epitopes(&epitopes))
        .await
        .unwrap();

    assert_eq!(run.epitopes.len(), 1);
    assert_eq!(
        generator.last_request().unwrap().fixed_positions,
        (17..=25).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_user_epitope_outside_parent_is_rejected() {
    let ws = Workspace::new();
    let epitopes = ws.root.join("epitopes.csv");
    std::fs::write(&epitopes, "sequence,start,end\nDAQXX,64,68\n").unwrap();

    let pipeline = ImmunogenicityPipeline::new(
        ws.config(ImmunogenicityMode::Reduce),
        collaborators(Arc::new(generator())),
    )
    .unwrap();
    let err = pipeline
        .run(&ws.inputs().with_user_epitopes(&epitopes))
        .await
        .unwrap_err();

    assert!(matches!(err, VlpimError::InvalidRegion { end: 68, parent_len: 66, .. }));
}

#[tokio::test]
async fn test_no_mutants_aborts() {
    let ws = Workspace::new();
    let generator = Arc::new(MockSequenceGenerator::new().with("12345"));
    let pipeline =
        ImmunogenicityPipeline::new(ws.config(ImmunogenicityMode::Reduce), collaborators(generator))
            .unwrap();

    let err = pipeline.run(&ws.inputs()).await.unwrap_err();
    match err {
        VlpimError::NoUsableData { stage } => assert_eq!(stage, "no mutant sequences generated"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(exists(&ws.out(), EPITOPES_FILE));
    assert!(!exists(&ws.out(), MUTANTS_FILE));
}

#[tokio::test]
async fn test_no_parent_binders_aborts() {
    let ws = Workspace::new();
    let mut collaborators = collaborators(Arc::new(generator()));
    collaborators.binding = Arc::new(MockBindingPredictor::new().with_records(mutant_records()));
    let pipeline =
        ImmunogenicityPipeline::new(ws.config(ImmunogenicityMode::Reduce), collaborators).unwrap();

    let err = pipeline.run(&ws.inputs()).await.unwrap_err();
    assert!(matches!(err, VlpimError::NoUsableData { .. }));
}

#[tokio::test]
async fn test_wrong_extension_rejected_before_any_output() {
    let ws = Workspace::new();
    let txt = ws.root.join("vlp.txt");
    std::fs::write(&txt, PARENT).unwrap();
    let pipeline = ImmunogenicityPipeline::new(
        ws.config(ImmunogenicityMode::Reduce),
        collaborators(Arc::new(generator())),
    )
    .unwrap();

    let err = pipeline
        .run(&PipelineInputs::new(&txt, ws.root.join("vlp.pdb")))
        .await
        .unwrap_err();
    assert!(matches!(err, VlpimError::InvalidExtension { .. }));
    assert!(!ws.out().exists());
}

#[test]
fn test_invalid_config_rejected() {
    let config = PipelineConfig {
        max_candidates: 0,
        ..Default::default()
    };
    let result = ImmunogenicityPipeline::new(config, collaborators(Arc::new(generator())));
    assert!(result.is_err());
}
