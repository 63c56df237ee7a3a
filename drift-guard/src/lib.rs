//! # drift-guard - Data validation for training pipelines
//!
//! drift-guard is the validation stage that sits between ingestion and model
//! training. It takes the train/test split written by ingestion, checks both
//! datasets against a declared schema, tests every column for distribution
//! drift with the two-sample Kolmogorov-Smirnov test, and hands training a
//! [`DataValidationArtifact`](artifact::DataValidationArtifact) describing
//! the outcome.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drift_guard::artifact::DataIngestionArtifact;
//! use drift_guard::config::{DataValidationConfig, TrainingPipelineConfig};
//! use drift_guard::pipeline::DataValidation;
//!
//! # async fn example() -> drift_guard::prelude::Result<()> {
//! let pipeline = TrainingPipelineConfig::new(chrono::Local::now());
//! let config = DataValidationConfig::new(&pipeline).with_schema_file("data_schema/schema.yaml");
//! let ingestion = DataIngestionArtifact::new("ingested/train.csv", "ingested/test.csv");
//!
//! let artifact = DataValidation::new(ingestion, config)?
//!     .initiate_data_validation()
//!     .await?;
//!
//! if !artifact.validation_status {
//!     eprintln!("drift report: {}", artifact.drift_report_file_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building blocks
//!
//! The stage is assembled from pieces that are usable on their own:
//!
//! - [`schema`]: the declared column list and numerical column set
//! - [`sources`]: CSV loading through DataFusion into a [`dataset::Dataset`]
//! - [`validators`]: column count and numerical column presence checks
//! - [`drift`]: the KS test, per-column detector and the YAML drift report
//! - [`formatters`]: human, JSON and Markdown renderings of a drift report
//! - [`records`]: row export towards the document store used by ingestion
//!
//! ## Logging
//!
//! Everything is instrumented with [`tracing`]. Install a subscriber with
//! [`logging::setup::init_logging`] or bring your own.

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod records;
pub mod schema;
pub mod sources;
pub mod validators;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
