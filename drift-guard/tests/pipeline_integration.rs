//! End-to-end tests for the data validation stage.

use drift_guard::artifact::{DataIngestionArtifact, DataValidationArtifact};
use drift_guard::config::{DataValidationConfig, StructuralPolicy, TrainingPipelineConfig};
use drift_guard::drift::DriftReport;
use drift_guard::pipeline::{DataValidation, ValidationStage};
use drift_guard::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a three-column CSV whose `a` column is offset by `shift`.
fn write_grid_csv(path: &Path, rows: usize, shift: f64) {
    let mut file = File::create(path).unwrap();
    writeln!(file, "a,b,c").unwrap();
    for i in 0..rows {
        let u = (i as f64 + 0.5) / rows as f64;
        writeln!(file, "{},{},{}", u + shift, u, 1.0 - u).unwrap();
    }
    file.flush().unwrap();
}

fn write_schema(dir: &Path, columns: &[&str]) -> PathBuf {
    let path = dir.join("schema.yaml");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "columns:").unwrap();
    for name in columns {
        writeln!(file, "  - {name}: float64").unwrap();
    }
    writeln!(file, "numerical_columns:").unwrap();
    for name in columns {
        writeln!(file, "  - {name}").unwrap();
    }
    path
}

struct Run {
    _dir: TempDir,
    root: PathBuf,
    ingestion: DataIngestionArtifact,
    config: DataValidationConfig,
}

fn setup(shift: f64, schema_columns: &[&str]) -> Run {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    let ingested = root.join("ingested");
    std::fs::create_dir_all(&ingested).unwrap();

    let train = ingested.join("train.csv");
    let test = ingested.join("test.csv");
    write_grid_csv(&train, 100, 0.0);
    write_grid_csv(&test, 100, shift);

    let schema = write_schema(&root, schema_columns);
    let pipeline = TrainingPipelineConfig::with_artifact_root(root.join("Artifacts"), chrono::Local::now());
    let config = DataValidationConfig::new(&pipeline).with_schema_file(schema);

    Run {
        _dir: dir,
        root,
        ingestion: DataIngestionArtifact::new(train, test),
        config,
    }
}

#[tokio::test]
async fn test_shifted_test_split_fails_validation() {
    let run = setup(5.0, &["a", "b", "c"]);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let artifact = stage.initiate_data_validation().await.unwrap();

    assert!(!artifact.validation_status);
    assert_eq!(artifact.invalid_train_file_path, None);
    assert_eq!(artifact.invalid_test_file_path, None);
    assert_eq!(artifact.drift_report_file_path, run.config.drift_report_file_path);

    let report = DriftReport::read_yaml(&artifact.drift_report_file_path).unwrap();
    assert_eq!(report.len(), 3);
    assert!(report.get("a").unwrap().drift_detected);
    assert!(!report.get("b").unwrap().drift_detected);
    assert!(!report.get("c").unwrap().drift_detected);
    assert_eq!(report.get("b").unwrap().p_value, 1.0);
}

#[tokio::test]
async fn test_stable_split_passes_and_copies_datasets() {
    let run = setup(0.0, &["a", "b", "c"]);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let artifact = stage.initiate_data_validation().await.unwrap();

    assert!(artifact.validation_status);
    assert_eq!(artifact.valid_train_file_path, run.config.valid_train_file_path);
    assert_eq!(artifact.valid_test_file_path, run.config.valid_test_file_path);
    assert!(artifact.valid_train_file_path.starts_with(&run.root));

    let copied = std::fs::read_to_string(&artifact.valid_train_file_path).unwrap();
    let mut lines = copied.lines();
    assert_eq!(lines.next(), Some("a,b,c"));
    assert_eq!(lines.count(), 100);

    assert_eq!(artifact.structural_reports.len(), 2);
    assert!(artifact.structural_reports.iter().all(|r| r.passed()));
}

#[tokio::test]
async fn test_structural_failure_is_permissive_by_default() {
    let run = setup(0.0, &["a", "b", "c", "d"]);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let artifact = stage.initiate_data_validation().await.unwrap();

    assert!(artifact.validation_status);
    assert!(artifact.structural_reports.iter().all(|r| !r.passed()));
}

#[tokio::test]
async fn test_gate_policy_fails_on_structure() {
    let run = setup(0.0, &["a", "b", "c", "d"]);
    let config = run
        .config
        .clone()
        .with_structural_policy(StructuralPolicy::Gate);
    let stage = DataValidation::new(run.ingestion.clone(), config).unwrap();

    let artifact = stage.initiate_data_validation().await.unwrap();

    assert!(!artifact.validation_status);
    let failures: Vec<&str> = artifact.structural_reports[0]
        .failures()
        .map(|c| c.check.as_str())
        .collect();
    assert_eq!(failures, vec!["column_count", "numerical_columns"]);
}

#[tokio::test]
async fn test_missing_test_file_aborts_in_read_stage() {
    let run = setup(0.0, &["a", "b", "c"]);
    std::fs::remove_file(&run.ingestion.test_file_path).unwrap();
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let err = stage.initiate_data_validation().await.unwrap_err();

    match &err {
        GuardError::StageFailed { stage, .. } => assert_eq!(*stage, ValidationStage::ReadDatasets),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(err.root_cause(), GuardError::Io { path, .. } if path == &run.ingestion.test_file_path));
    assert!(!run.config.drift_report_file_path.exists());
}

#[tokio::test]
async fn test_text_column_aborts_in_drift_stage() {
    let run = setup(0.0, &["a", "b", "c"]);
    let mut file = File::create(&run.ingestion.test_file_path).unwrap();
    writeln!(file, "a,b,c").unwrap();
    writeln!(file, "x,0.1,0.2").unwrap();
    writeln!(file, "y,0.3,0.4").unwrap();
    drop(file);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let err = stage.initiate_data_validation().await.unwrap_err();

    assert!(matches!(
        err,
        GuardError::StageFailed {
            stage: ValidationStage::CheckDrift,
            ..
        }
    ));
    match err.root_cause() {
        GuardError::StatisticalComputation { column, .. } => assert_eq!(column, "a"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_nan_threshold_aborts_in_drift_stage() {
    let run = setup(5.0, &["a", "b", "c"]);
    let config = run.config.clone().with_drift_threshold(f64::NAN);
    let stage = DataValidation::new(run.ingestion.clone(), config).unwrap();

    let err = stage.initiate_data_validation().await.unwrap_err();

    assert!(matches!(
        err,
        GuardError::StageFailed {
            stage: ValidationStage::CheckDrift,
            ..
        }
    ));
    assert!(matches!(err.root_cause(), GuardError::InvalidThreshold { threshold } if threshold.is_nan()));
    assert!(!run.config.drift_report_file_path.exists());
}

#[tokio::test]
async fn test_rerun_writes_identical_report() {
    let run = setup(5.0, &["a", "b", "c"]);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();

    let first = stage.initiate_data_validation().await.unwrap();
    let first_bytes = std::fs::read(&first.drift_report_file_path).unwrap();
    let second = stage.initiate_data_validation().await.unwrap();
    let second_bytes = std::fs::read(&second.drift_report_file_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn test_artifact_round_trips_through_json() {
    let run = setup(5.0, &["a", "b", "c"]);
    let stage = DataValidation::new(run.ingestion.clone(), run.config.clone()).unwrap();
    let artifact = stage.initiate_data_validation().await.unwrap();

    let path = run.root.join("data_validation_artifact.json");
    artifact.write_json(&path).unwrap();

    assert_eq!(DataValidationArtifact::read_json(&path).unwrap(), artifact);
}
