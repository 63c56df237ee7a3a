//! Explicit configuration for a validation run.
//!
//! Nothing in the core reads the environment. A [`TrainingPipelineConfig`]
//! is built once per pipeline execution and every stage derives its own
//! paths from it.

use crate::drift::DEFAULT_DRIFT_THRESHOLD;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PIPELINE_NAME: &str = "NetworkSecurity";
pub const ARTIFACT_DIR: &str = "Artifacts";
pub const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";
pub const SCHEMA_FILE_PATH: &str = "data_schema/schema.yaml";

pub const TRAIN_FILE_NAME: &str = "train.csv";
pub const TEST_FILE_NAME: &str = "test.csv";

pub const DATA_VALIDATION_DIR_NAME: &str = "data_validation";
pub const DATA_VALIDATION_VALID_DIR: &str = "validated";
pub const DATA_VALIDATION_INVALID_DIR: &str = "invalid";
pub const DATA_VALIDATION_DRIFT_REPORT_DIR: &str = "drift_report";
pub const DATA_VALIDATION_DRIFT_REPORT_FILE_NAME: &str = "report.yaml";

/// Pipeline-wide settings: where this run's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPipelineConfig {
    pub pipeline_name: String,
    /// `<artifact_root>/<timestamp>`
    pub artifact_dir: PathBuf,
    pub timestamp: String,
}

impl TrainingPipelineConfig {
    /// Builds the config for a run started at `timestamp`, under `Artifacts/`.
    pub fn new(timestamp: DateTime<Local>) -> Self {
        Self::with_artifact_root(ARTIFACT_DIR, timestamp)
    }

    /// Builds the config for a run started at `timestamp`, under `root`.
    pub fn with_artifact_root(root: impl AsRef<Path>, timestamp: DateTime<Local>) -> Self {
        let timestamp = timestamp.format(TIMESTAMP_FORMAT).to_string();
        Self {
            pipeline_name: PIPELINE_NAME.to_string(),
            artifact_dir: root.as_ref().join(&timestamp),
            timestamp,
        }
    }
}

/// Whether structural check failures affect the validation verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralPolicy {
    /// Failures are logged and recorded but do not change the verdict.
    #[default]
    Permissive,
    /// Any structural failure marks the run as not passed.
    Gate,
}

/// Output locations and knobs for the data validation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationConfig {
    pub data_validation_dir: PathBuf,
    pub valid_data_dir: PathBuf,
    pub invalid_data_dir: PathBuf,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: PathBuf,
    pub invalid_test_file_path: PathBuf,
    pub drift_report_file_path: PathBuf,
    pub schema_file_path: PathBuf,
    pub drift_threshold: f64,
    pub structural_policy: StructuralPolicy,
}

impl DataValidationConfig {
    /// Derives the stage layout from the pipeline's artifact directory.
    pub fn new(pipeline: &TrainingPipelineConfig) -> Self {
        Self::under(&pipeline.artifact_dir)
    }

    /// Derives the stage layout under an arbitrary artifact directory.
    pub fn under(artifact_dir: impl AsRef<Path>) -> Self {
        let data_validation_dir = artifact_dir.as_ref().join(DATA_VALIDATION_DIR_NAME);
        let valid_data_dir = data_validation_dir.join(DATA_VALIDATION_VALID_DIR);
        let invalid_data_dir = data_validation_dir.join(DATA_VALIDATION_INVALID_DIR);

        Self {
            valid_train_file_path: valid_data_dir.join(TRAIN_FILE_NAME),
            valid_test_file_path: valid_data_dir.join(TEST_FILE_NAME),
            invalid_train_file_path: invalid_data_dir.join(TRAIN_FILE_NAME),
            invalid_test_file_path: invalid_data_dir.join(TEST_FILE_NAME),
            drift_report_file_path: data_validation_dir
                .join(DATA_VALIDATION_DRIFT_REPORT_DIR)
                .join(DATA_VALIDATION_DRIFT_REPORT_FILE_NAME),
            schema_file_path: PathBuf::from(SCHEMA_FILE_PATH),
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            structural_policy: StructuralPolicy::default(),
            data_validation_dir,
            valid_data_dir,
            invalid_data_dir,
        }
    }

    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file_path = path.into();
        self
    }

    pub fn with_drift_threshold(mut self, threshold: f64) -> Self {
        self.drift_threshold = threshold;
        self
    }

    pub fn with_structural_policy(mut self, policy: StructuralPolicy) -> Self {
        self.structural_policy = policy;
        self
    }
}
