//! Records handed from one pipeline stage to the next.

use crate::prelude::*;
use crate::validators::StructuralReport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output of the ingestion stage: where the train/test split landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIngestionArtifact {
    pub trained_file_path: PathBuf,
    pub test_file_path: PathBuf,
}

impl DataIngestionArtifact {
    pub fn new(trained_file_path: impl Into<PathBuf>, test_file_path: impl Into<PathBuf>) -> Self {
        Self {
            trained_file_path: trained_file_path.into(),
            test_file_path: test_file_path.into(),
        }
    }
}

/// Output of the validation stage, consumed by training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationArtifact {
    /// Overall verdict
    pub validation_status: bool,
    pub valid_train_file_path: PathBuf,
    pub valid_test_file_path: PathBuf,
    pub invalid_train_file_path: Option<PathBuf>,
    pub invalid_test_file_path: Option<PathBuf>,
    pub drift_report_file_path: PathBuf,
    /// Structural check outcomes for the train and test datasets
    #[serde(default)]
    pub structural_reports: Vec<StructuralReport>,
}

impl DataValidationArtifact {
    /// Writes the artifact as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GuardError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            GuardError::Serialization(format!("Failed to encode validation artifact: {e}"))
        })?;
        std::fs::write(path, json).map_err(|e| GuardError::io(path, e))
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GuardError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| {
            GuardError::Serialization(format!("Failed to decode validation artifact: {e}"))
        })
    }
}
