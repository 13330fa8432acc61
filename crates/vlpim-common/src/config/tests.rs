use super::*;
use std::io::Write;

#[test]
fn test_defaults_match_documented_values() {
    let config = PipelineConfig::default();
    assert_eq!(config.mode, ImmunogenicityMode::Reduce);
    assert_eq!(config.epitopes_number, 10);
    assert_eq!(config.epitope_length, 15);
    assert_eq!(config.samples_per_temp, 20);
    assert_eq!(config.temperatures, vec![0.1, 0.3, 0.5]);
    assert_eq!(config.hla_alleles.len(), 8);
    assert_eq!(config.max_candidates, 10);
    assert!((config.rmsd_threshold - 2.0).abs() < 1e-9);
    assert!((config.neutral_score - 50.0).abs() < 1e-9);
    assert_eq!(config.score_aggregation, ScoreAggregation::Mean);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_fills_defaults() {
    let config = PipelineConfig::from_toml(
        r#"
        mode = "enhance"
        epitopes_number = 4
        score_aggregation = "sum"
        "#,
    )
    .unwrap();
    assert_eq!(config.mode, ImmunogenicityMode::Enhance);
    assert_eq!(config.epitopes_number, 4);
    assert_eq!(config.score_aggregation, ScoreAggregation::Sum);
    assert_eq!(config.max_candidates, default_max_candidates());
}

#[test]
fn test_yaml_and_json_loaders() {
    let yaml = PipelineConfig::from_yaml("mode: enhance\nmax_candidates: 3\n").unwrap();
    assert_eq!(yaml.max_candidates, 3);

    let json = PipelineConfig::default().to_json().unwrap();
    let back = PipelineConfig::from_json(&json).unwrap();
    assert_eq!(back, PipelineConfig::default());
}

#[test]
fn test_from_path_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "epitope_length: 12").unwrap();
    let config = PipelineConfig::from_path(&path).unwrap();
    assert_eq!(config.epitope_length, 12);

    let bad = dir.path().join("run.ini");
    std::fs::write(&bad, "x").unwrap();
    assert!(matches!(
        PipelineConfig::from_path(&bad),
        Err(VlpimError::InvalidExtension { .. })
    ));

    assert!(matches!(
        PipelineConfig::from_path(&dir.path().join("absent.toml")),
        Err(VlpimError::MissingInput(_))
    ));
}

#[test]
fn test_validate_rejects_unusable_values() {
    let mut config = PipelineConfig::default();
    config.epitopes_number = 0;
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.hla_alleles.clear();
    assert!(config.validate().is_err());

    let mut config = PipelineConfig::default();
    config.neutral_score = 120.0;
    assert!(config.validate().is_err());

    // Out-of-range lengths are clamped downstream, not rejected.
    let mut config = PipelineConfig::default();
    config.epitope_length = 30;
    assert!(config.validate().is_ok());
}

#[test]
fn test_stage_views() {
    let mut config = PipelineConfig::default();
    config.mode = ImmunogenicityMode::Enhance;
    config.buns_threshold = 7;
    assert_eq!(config.selection().mode, ImmunogenicityMode::Enhance);
    assert_eq!(config.scoring().neutral_score, 50.0);
    assert_eq!(config.thresholds().buns, 7.0);
}
