//! Column-count and numerical-column checks against a schema.
//!
//! Both checks are pure. [`StructuralValidator`] runs all of them and
//! records every outcome instead of stopping at the first failure, so the
//! caller sees the full list of structural defects at once.

use crate::dataset::Dataset;
use crate::schema::SchemaDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Returns true iff the dataset has exactly the declared number of columns.
pub fn validate_column_count(dataset: &Dataset, schema: &SchemaDefinition) -> bool {
    dataset.num_columns() == schema.total_column_count()
}

/// Schema-required numerical columns that are absent or not numerically typed.
pub fn missing_numerical_columns(dataset: &Dataset, schema: &SchemaDefinition) -> BTreeSet<String> {
    let actual: BTreeSet<String> = dataset.numeric_column_names().into_iter().collect();
    schema
        .numerical_column_names()
        .difference(&actual)
        .cloned()
        .collect()
}

/// Returns true iff every schema-required numerical column is numeric in the dataset.
///
/// Extra numeric columns are allowed and column order does not matter.
pub fn validate_numerical_columns(dataset: &Dataset, schema: &SchemaDefinition) -> bool {
    missing_numerical_columns(dataset, schema).is_empty()
}

/// The outcome of a single structural check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Success,
    Failure,
}

impl CheckStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Failure)
    }
}

impl From<bool> for CheckStatus {
    fn from(passed: bool) -> Self {
        if passed {
            CheckStatus::Success
        } else {
            CheckStatus::Failure
        }
    }
}

/// The result of one check against one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier (`column_count`, `numerical_columns`)
    pub check: String,
    pub status: CheckStatus,
    /// Diagnostic message, present on failure
    pub message: Option<String>,
}

impl CheckResult {
    pub fn success(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            status: CheckStatus::Success,
            message: None,
        }
    }

    pub fn failure(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            status: CheckStatus::Failure,
            message: Some(message.into()),
        }
    }
}

/// All structural check results for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralReport {
    /// Dataset label, e.g. `train` or `test`
    pub dataset: String,
    pub checks: Vec<CheckResult>,
}

impl StructuralReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status.is_failure())
    }
}

/// Runs every structural check of a schema against datasets.
#[derive(Debug, Clone, Copy)]
pub struct StructuralValidator<'a> {
    schema: &'a SchemaDefinition,
}

impl<'a> StructuralValidator<'a> {
    pub fn new(schema: &'a SchemaDefinition) -> Self {
        Self { schema }
    }

    /// Runs all checks against `dataset`, labelling results with `label`.
    pub fn validate(&self, label: &str, dataset: &Dataset) -> StructuralReport {
        let mut checks = Vec::with_capacity(2);

        let expected = self.schema.total_column_count();
        let actual = dataset.num_columns();
        info!(
            dataset = label,
            expected_columns = expected,
            actual_columns = actual,
            "Checking column count"
        );
        if validate_column_count(dataset, self.schema) {
            checks.push(CheckResult::success("column_count"));
        } else {
            checks.push(CheckResult::failure(
                "column_count",
                format!("{label} dataset has {actual} columns, schema declares {expected}"),
            ));
        }

        let missing = missing_numerical_columns(dataset, self.schema);
        if missing.is_empty() {
            checks.push(CheckResult::success("numerical_columns"));
        } else {
            let names = missing.into_iter().collect::<Vec<_>>().join(", ");
            checks.push(CheckResult::failure(
                "numerical_columns",
                format!("{label} dataset does not contain all numerical columns; missing: {names}"),
            ));
        }

        let report = StructuralReport {
            dataset: label.to_string(),
            checks,
        };
        for failure in report.failures() {
            warn!(
                dataset = label,
                check = %failure.check,
                message = failure.message.as_deref().unwrap_or_default(),
                "Structural check failed"
            );
        }
        report
    }
}
