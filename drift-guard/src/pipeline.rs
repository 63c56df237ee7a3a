//! The data validation stage of the training pipeline.
//!
//! A run moves through a fixed sequence of stages:
//!
//! ```text
//! START → READ_DATASETS → CHECK_STRUCTURE → CHECK_DRIFT → PERSIST_OUTPUTS → DONE
//! ```
//!
//! Any error aborts the run. It is returned wrapped in
//! [`GuardError::StageFailed`] naming the stage it happened in, and no
//! artifact is produced. Nothing is retried and files already written by
//! earlier stages are left in place.

use crate::artifact::{DataIngestionArtifact, DataValidationArtifact};
use crate::config::{DataValidationConfig, StructuralPolicy};
use crate::dataset::Dataset;
use crate::drift::{DriftDetector, DriftOutcome};
use crate::logging::LogConfig;
use crate::prelude::*;
use crate::schema::SchemaDefinition;
use crate::sources::{CsvOptions, CsvSource, DataSource};
use crate::validators::{self, StructuralValidator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Stages of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStage {
    Start,
    ReadDatasets,
    CheckStructure,
    CheckDrift,
    PersistOutputs,
    Done,
    Failed,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::ReadDatasets => "READ_DATASETS",
            Self::CheckStructure => "CHECK_STRUCTURE",
            Self::CheckDrift => "CHECK_DRIFT",
            Self::PersistOutputs => "PERSIST_OUTPUTS",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates the train/test split produced by ingestion.
///
/// Constructed fresh for each pipeline execution. Two instances writing to
/// the same output paths concurrently will interleave their writes; callers
/// that trigger runs in parallel must give each run its own artifact
/// directory.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::artifact::DataIngestionArtifact;
/// use drift_guard::config::{DataValidationConfig, TrainingPipelineConfig};
/// use drift_guard::pipeline::DataValidation;
///
/// # async fn example() -> drift_guard::prelude::Result<()> {
/// let pipeline = TrainingPipelineConfig::new(chrono::Local::now());
/// let ingestion = DataIngestionArtifact::new("ingested/train.csv", "ingested/test.csv");
/// let stage = DataValidation::new(ingestion, DataValidationConfig::new(&pipeline))?;
///
/// let artifact = stage.initiate_data_validation().await?;
/// println!("validation passed: {}", artifact.validation_status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DataValidation {
    ingestion: DataIngestionArtifact,
    config: DataValidationConfig,
    schema: SchemaDefinition,
    csv_options: CsvOptions,
    log_config: LogConfig,
}

impl DataValidation {
    /// Creates the stage, loading the schema from `config.schema_file_path`.
    pub fn new(ingestion: DataIngestionArtifact, config: DataValidationConfig) -> Result<Self> {
        let schema = SchemaDefinition::load(&config.schema_file_path)?;
        Ok(Self::with_schema(ingestion, config, schema))
    }

    /// Creates the stage with an already loaded schema.
    pub fn with_schema(
        ingestion: DataIngestionArtifact,
        config: DataValidationConfig,
        schema: SchemaDefinition,
    ) -> Self {
        Self {
            ingestion,
            config,
            schema,
            csv_options: CsvOptions::default(),
            log_config: LogConfig::default(),
        }
    }

    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv_options = options;
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn config(&self) -> &DataValidationConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Reads a CSV dataset with this stage's reader options.
    pub async fn read_data(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        CsvSource::with_options(path.as_ref(), self.csv_options.clone())
            .load()
            .await
    }

    pub fn validate_number_of_columns(&self, dataset: &Dataset) -> bool {
        validators::validate_column_count(dataset, &self.schema)
    }

    pub fn validate_numerical_columns(&self, dataset: &Dataset) -> bool {
        validators::validate_numerical_columns(dataset, &self.schema)
    }

    /// Compares `current` against `base` at the configured threshold and
    /// writes the drift report to the configured path.
    pub fn detect_dataset_drift(&self, base: &Dataset, current: &Dataset) -> Result<DriftOutcome> {
        DriftDetector::new()
            .with_threshold(self.config.drift_threshold)
            .with_log_config(self.log_config.clone())
            .detect_and_persist(base, current, &self.config.drift_report_file_path)
    }

    /// Runs the whole stage and returns the artifact for training.
    #[instrument(skip(self), fields(
        train.path = %self.ingestion.trained_file_path.display(),
        test.path = %self.ingestion.test_file_path.display(),
        threshold = self.config.drift_threshold
    ))]
    pub async fn initiate_data_validation(&self) -> Result<DataValidationArtifact> {
        let mut stage = ValidationStage::Start;
        match self.run(&mut stage).await {
            Ok(artifact) => {
                info!(
                    stage = %ValidationStage::Done,
                    validation_status = artifact.validation_status,
                    "Data validation completed"
                );
                Ok(artifact)
            }
            Err(e) => {
                warn!(stage = %stage, next = %ValidationStage::Failed, error = %e, "Data validation aborted");
                Err(e.in_stage(stage))
            }
        }
    }

    async fn run(&self, stage: &mut ValidationStage) -> Result<DataValidationArtifact> {
        self.enter(stage, ValidationStage::ReadDatasets);
        let train = self.read_data(&self.ingestion.trained_file_path).await?;
        let test = self.read_data(&self.ingestion.test_file_path).await?;
        crate::log_data_op!(
            self.log_config,
            train.rows = train.num_rows(),
            test.rows = test.num_rows(),
            "Read train and test datasets"
        );

        self.enter(stage, ValidationStage::CheckStructure);
        let validator = StructuralValidator::new(&self.schema);
        let structural_reports = vec![
            validator.validate("train", &train),
            validator.validate("test", &test),
        ];
        let structure_ok = structural_reports.iter().all(|r| r.passed());

        // Structural failures are diagnostics only unless the policy gates on them.
        self.enter(stage, ValidationStage::CheckDrift);
        let drift = self.detect_dataset_drift(&train, &test)?;

        self.enter(stage, ValidationStage::PersistOutputs);
        train.write_csv(&self.config.valid_train_file_path)?;
        test.write_csv(&self.config.valid_test_file_path)?;
        crate::log_data_op!(
            self.log_config,
            valid_train = %self.config.valid_train_file_path.display(),
            valid_test = %self.config.valid_test_file_path.display(),
            "Persisted validated datasets"
        );

        let validation_status = match self.config.structural_policy {
            StructuralPolicy::Permissive => drift.status,
            StructuralPolicy::Gate => drift.status && structure_ok,
        };

        *stage = ValidationStage::Done;
        Ok(DataValidationArtifact {
            validation_status,
            valid_train_file_path: self.config.valid_train_file_path.clone(),
            valid_test_file_path: self.config.valid_test_file_path.clone(),
            invalid_train_file_path: None,
            invalid_test_file_path: None,
            drift_report_file_path: self.config.drift_report_file_path.clone(),
            structural_reports,
        })
    }

    fn enter(&self, stage: &mut ValidationStage, next: ValidationStage) {
        debug!(from = %stage, to = %next, "Entering validation stage");
        *stage = next;
    }
}
