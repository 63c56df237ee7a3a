//! Error types for the drift-guard validation stage.
//!
//! Every failure raised by a lower layer (file I/O, CSV parsing, the
//! statistics module) is wrapped into [`GuardError`] at the point where it
//! happens, together with the path or column needed to diagnose it.
//! Library-specific error types never cross the crate boundary unwrapped.

use crate::drift::KsError;
use crate::pipeline::ValidationStage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for drift-guard.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Schema or configuration file missing or malformed.
    #[error("Configuration error in '{}': {message}", path.display())]
    Config {
        /// File the configuration was read from
        path: PathBuf,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A dataset could not be read or an output could not be written.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The current dataset lacks a column present in the base dataset.
    #[error("Column '{column}' present in base dataset but missing from current dataset")]
    SchemaMismatch { column: String },

    /// Degenerate input to the two-sample distribution test.
    #[error("Drift test failed for column '{column}': {source}")]
    StatisticalComputation {
        column: String,
        #[source]
        source: KsError,
    },

    /// Drift threshold outside `[0, 1]` or not a number.
    #[error("Drift threshold {threshold} must be a finite value in [0, 1]")]
    InvalidThreshold { threshold: f64 },

    /// Error from data source operations that are not plain I/O.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A pipeline stage failed; the run is aborted and no artifact is produced.
    #[error("Data validation failed during {stage}: {source}")]
    StageFailed {
        stage: ValidationStage,
        #[source]
        source: Box<GuardError>,
    },
}

/// A type alias for `Result<T, GuardError>`.
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates a configuration error without an underlying cause.
    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a source error.
    pub fn config_with_source(
        path: impl AsRef<Path>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an I/O error bound to the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Wraps this error with the pipeline stage it surfaced in.
    pub fn in_stage(self, stage: ValidationStage) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through stage wrappers.
    pub fn root_cause(&self) -> &GuardError {
        match self {
            Self::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds a fixed message as context.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| GuardError::DataSource {
            source_type: "internal".to_string(),
            message: format!("{}: {e}", f()),
            source: Some(Box::new(e)),
        })
    }
}
