use std::sync::Arc;

use super::*;
use crate::logic::features::{
    demo_table, FeatureBuilder, FeatureTable, FeatureVector, LabeledRow,
};
use crate::logic::label::LabelThresholds;
use crate::logic::model::{
    load_artifact, Evaluation, ForestParams, InMemoryModelRepository, RiskPredictor,
};

fn demo() -> FeatureTable {
    FeatureBuilder::new().build(vec![demo_table()]).unwrap()
}

fn config_at(path: std::path::PathBuf) -> TrainerConfig {
    TrainerConfig {
        model_path: path,
        ..Default::default()
    }
}

#[test]
fn test_default_config() {
    let config = TrainerConfig::default();
    assert_eq!(config.test_ratio, 0.2);
    assert_eq!(config.min_holdout_rows, 5);
    assert_eq!(config.forest, ForestParams::default());
    assert!(config.model_path.ends_with("risk_model.json"));
}

#[test]
fn test_empty_table_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let trainer = Trainer::new(config_at(path.clone()));

    let err = trainer.run(&FeatureTable::default(), &LabelThresholds::default()).unwrap_err();
    assert!(matches!(err, TrainError::Data(_)));
    assert!(!path.exists());
}

#[test]
fn test_zero_trees_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let mut config = config_at(path.clone());
    config.forest.n_trees = 0;

    let err = Trainer::new(config).run(&demo(), &LabelThresholds::default()).unwrap_err();
    assert!(matches!(err, TrainError::Configuration(_)));
    assert!(!path.exists());
}

#[test]
fn test_no_sources_is_configuration_error() {
    let err: TrainError = FeatureBuilder::new().build(Vec::new()).unwrap_err().into();
    assert!(matches!(err, TrainError::Configuration(_)));
}

#[test]
fn test_holdout_split_on_demo_data() {
    let trainer = Trainer::new(TrainerConfig::default());
    let artifact = trainer.train(&demo(), &LabelThresholds::default()).unwrap();

    assert_eq!(artifact.forest.n_trees(), 100);
    assert_eq!(artifact.summary.rows, 10);
    assert_eq!(artifact.summary.balance.safe, 7);
    assert_eq!(artifact.summary.balance.at_risk, 3);
    match &artifact.summary.evaluation {
        Evaluation::HeldOut { train_rows, test_rows, report } => {
            assert_eq!((*train_rows, *test_rows), (8, 2));
            assert_eq!(report.safe.support + report.at_risk.support, 2);
        }
        other => panic!("expected held-out evaluation, got {:?}", other),
    }
}

#[test]
fn test_small_table_uses_resubstitution() {
    let rows = vec![
        LabeledRow::new(FeatureVector::new(95.0, 85.0, 0.0, 50_000.0, 1.0)),
        LabeledRow::new(FeatureVector::new(40.0, 35.0, 10.0, 5_000.0, 7.0)),
        LabeledRow::new(FeatureVector::new(90.0, 88.0, 0.0, 45_000.0, 2.0)),
    ];
    let trainer = Trainer::new(TrainerConfig::default());
    let artifact = trainer
        .train(&FeatureTable::from_rows(rows), &LabelThresholds::default())
        .unwrap();

    assert!(matches!(artifact.summary.evaluation, Evaluation::Resubstitution { .. }));
    assert!((0.0..=1.0).contains(&artifact.summary.evaluation.accuracy()));
}

#[test]
fn test_invalid_test_ratio() {
    let trainer = Trainer::new(TrainerConfig { test_ratio: 1.5, ..Default::default() });
    let err = trainer.train(&demo(), &LabelThresholds::default()).unwrap_err();
    assert!(matches!(err, TrainError::Configuration(_)));
}

#[test]
fn test_overrides_recorded_in_summary() {
    let rows = vec![
        LabeledRow::with_override(FeatureVector::new(95.0, 85.0, 0.0, 50_000.0, 1.0), true),
        LabeledRow::new(FeatureVector::new(40.0, 35.0, 10.0, 5_000.0, 7.0)),
    ];
    let trainer = Trainer::new(TrainerConfig::default());
    let artifact = trainer
        .train(&FeatureTable::from_rows(rows), &LabelThresholds::default())
        .unwrap();

    assert_eq!(artifact.summary.label_overrides, 1);
    assert_eq!(artifact.summary.balance.at_risk, 2);
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a").join("model.json");
    let second = dir.path().join("b").join("model.json");

    Trainer::new(config_at(first.clone()))
        .run(&demo(), &LabelThresholds::default())
        .unwrap();
    Trainer::new(config_at(second.clone()))
        .run(&demo(), &LabelThresholds::default())
        .unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_trained_model_scores_safe_record_low() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let outcome = Trainer::new(config_at(path.clone()))
        .run(&demo(), &LabelThresholds::default())
        .unwrap();
    assert_eq!(outcome.path, path);

    let artifact = load_artifact(&path).unwrap();
    assert_eq!(artifact, outcome.artifact);

    let predictor = RiskPredictor::new(Arc::new(InMemoryModelRepository::with_artifact(artifact)));
    let score = predictor.score(&FeatureVector::new(95.0, 85.0, 0.0, 50_000.0, 1.0));
    assert!(!score.is_degraded());
    assert!(score.probability < 0.5, "safe record scored {}", score.probability);
    assert_eq!(score.percent(), (score.probability * 100.0).round());
}

#[tokio::test]
async fn test_collect_skips_missing_sources() {
    let dir = tempfile::tempdir().unwrap();
    let sources = TrainingSources {
        database_url: Some(format!("sqlite://{}", dir.path().join("absent.db").display())),
        spreadsheets: vec![dir.path().join("absent.xlsx")],
        demo_data: false,
    };

    assert!(sources.collect().await.is_empty());
    assert_eq!(sources.describe().len(), 2);
}

#[tokio::test]
async fn test_collect_reads_csv_and_demo() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("extra.csv");
    std::fs::write(
        &csv,
        "attendance,grade,violations,allowance,sibling_count\n70,60,1,20000,2\n",
    )
    .unwrap();

    let sources = TrainingSources {
        database_url: None,
        spreadsheets: vec![csv],
        demo_data: true,
    };
    let tables = sources.collect().await;
    assert_eq!(tables.len(), 2);

    let table = FeatureBuilder::new().build(tables).unwrap();
    assert_eq!(table.len(), 11);
    assert_eq!(table.sources.len(), 2);
}
