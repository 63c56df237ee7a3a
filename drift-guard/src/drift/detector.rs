//! Column-by-column drift detection between a base and a current dataset.

use super::report::{ColumnDrift, DriftReport};
use super::statistical::{ks_2samp, KsError, KsMethod};
use crate::dataset::Dataset;
use crate::logging::LogConfig;
use crate::prelude::*;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Significance level below which a column is flagged as drifted.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Result of comparing two datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftOutcome {
    /// True when no column drifted
    pub status: bool,
    pub report: DriftReport,
}

/// Runs the two-sample KS test on every column of the base dataset.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::drift::DriftDetector;
/// # use drift_guard::dataset::Dataset;
/// # fn example(base: &Dataset, current: &Dataset) -> drift_guard::prelude::Result<()> {
/// let outcome = DriftDetector::new().with_threshold(0.01).detect(base, current)?;
/// for column in outcome.report.drifted_columns() {
///     println!("{column} drifted");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DriftDetector {
    threshold: f64,
    method: KsMethod,
    log_config: LogConfig,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_DRIFT_THRESHOLD,
            method: KsMethod::Auto,
            log_config: LogConfig::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_method(mut self, method: KsMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compares `current` against `base` without touching the filesystem.
    ///
    /// The report has exactly one entry per base column. A column is
    /// drifted when its p-value is strictly below the threshold, and any
    /// drifted column makes the overall status false.
    ///
    /// Fails with [`GuardError::InvalidThreshold`] unless the threshold is
    /// in `[0, 1]`, with [`GuardError::SchemaMismatch`] when `current` lacks
    /// a base column and with [`GuardError::StatisticalComputation`] when a
    /// column is non-numeric or has no non-null values.
    pub fn detect(&self, base: &Dataset, current: &Dataset) -> Result<DriftOutcome> {
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(GuardError::InvalidThreshold {
                threshold: self.threshold,
            });
        }

        let mut report = DriftReport::new();
        let mut status = true;

        for column in base.column_names() {
            if !current.has_column(&column) {
                return Err(GuardError::SchemaMismatch { column });
            }

            let d1 = numeric_sample(base, &column)?;
            let d2 = numeric_sample(current, &column)?;
            let test = ks_2samp(&d1, &d2, self.method).map_err(|source| {
                GuardError::StatisticalComputation {
                    column: column.clone(),
                    source,
                }
            })?;

            let drift_detected = test.p_value < self.threshold;
            if drift_detected {
                status = false;
            }

            crate::log_column!(
                self.log_config,
                column = %column,
                statistic = test.statistic,
                p_value = test.p_value,
                method = ?test.method,
                drift_detected,
                "Column drift test"
            );

            report.insert(
                column,
                ColumnDrift {
                    p_value: test.p_value,
                    drift_detected,
                },
            );
        }

        let drifted = report.drifted_columns();
        if drifted.is_empty() {
            info!(columns = report.len(), threshold = self.threshold, "No drift detected");
        } else {
            warn!(
                columns = report.len(),
                drifted = drifted.len(),
                threshold = self.threshold,
                drifted_columns = %crate::logging::truncate_field(
                    &drifted.join(","),
                    self.log_config.max_field_length
                ),
                "Drift detected"
            );
        }

        Ok(DriftOutcome { status, report })
    }

    /// Runs [`detect`](Self::detect) and persists the report as YAML at
    /// `report_path`, creating parent directories.
    #[instrument(skip(self, base, current, report_path), fields(report.path = %report_path.as_ref().display()))]
    pub fn detect_and_persist(
        &self,
        base: &Dataset,
        current: &Dataset,
        report_path: impl AsRef<Path>,
    ) -> Result<DriftOutcome> {
        let outcome = self.detect(base, current)?;
        outcome.report.write_yaml(report_path.as_ref())?;
        Ok(outcome)
    }
}

/// Compares `current_dataset` against `base_dataset` at `threshold` and
/// writes the report to `report_path`.
pub fn detect_dataset_drift(
    base_dataset: &Dataset,
    current_dataset: &Dataset,
    threshold: f64,
    report_path: impl AsRef<Path>,
) -> Result<DriftOutcome> {
    DriftDetector::new()
        .with_threshold(threshold)
        .detect_and_persist(base_dataset, current_dataset, report_path)
}

fn numeric_sample(dataset: &Dataset, column: &str) -> Result<Vec<f64>> {
    match dataset.numeric_values(column)? {
        Some(values) => Ok(values),
        None => Err(GuardError::StatisticalComputation {
            column: column.to_string(),
            source: KsError::NonNumeric {
                data_type: dataset
                    .data_type(column)
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn float_dataset(columns: &[(&str, Vec<Option<f64>>)]) -> Dataset {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(n, _)| Field::new(*n, DataType::Float64, true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|(_, v)| Arc::new(Float64Array::from(v.clone())) as ArrayRef)
            .collect();
        Dataset::new(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap())
    }

    fn ramp(offset: f64) -> Vec<Option<f64>> {
        (0..50).map(|i| Some(offset + i as f64 / 50.0)).collect()
    }

    #[test]
    fn test_identical_datasets_are_stable() {
        let ds = float_dataset(&[("a", ramp(0.0)), ("b", ramp(3.0))]);
        let outcome = DriftDetector::new().detect(&ds, &ds).unwrap();

        assert!(outcome.status);
        assert_eq!(outcome.report.len(), 2);
        for (_, drift) in &outcome.report {
            assert_eq!(drift.p_value, 1.0);
            assert!(!drift.drift_detected);
        }
    }

    #[test]
    fn test_rejects_threshold_outside_unit_interval() {
        let ds = float_dataset(&[("a", ramp(0.0))]);
        for threshold in [f64::NAN, -0.01, 1.5, f64::INFINITY] {
            let err = DriftDetector::new()
                .with_threshold(threshold)
                .detect(&ds, &ds)
                .unwrap_err();
            assert!(
                matches!(err, GuardError::InvalidThreshold { .. }),
                "threshold {threshold}: {err}"
            );
        }
        assert!(DriftDetector::new().with_threshold(0.0).detect(&ds, &ds).is_ok());
        assert!(DriftDetector::new().with_threshold(1.0).detect(&ds, &ds).is_ok());
    }

    #[test]
    fn test_shifted_column_is_flagged() {
        let base = float_dataset(&[("a", ramp(0.0)), ("b", ramp(0.0))]);
        let current = float_dataset(&[("a", ramp(5.0)), ("b", ramp(0.0))]);
        let outcome = DriftDetector::new().detect(&base, &current).unwrap();

        assert!(!outcome.status);
        assert!(outcome.report.get("a").unwrap().drift_detected);
        assert!(!outcome.report.get("b").unwrap().drift_detected);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let base = float_dataset(&[("a", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        let current = float_dataset(&[("a", vec![Some(4.0), Some(5.0), Some(6.0)])]);
        let p = DriftDetector::new()
            .detect(&base, &current)
            .unwrap()
            .report
            .get("a")
            .unwrap()
            .p_value;

        // p == threshold counts as no drift
        let at = DriftDetector::new().with_threshold(p).detect(&base, &current).unwrap();
        assert!(at.status);
        let above = DriftDetector::new()
            .with_threshold(p + 1e-9)
            .detect(&base, &current)
            .unwrap();
        assert!(!above.status);
    }

    #[test]
    fn test_missing_column_in_current() {
        let base = float_dataset(&[("a", ramp(0.0)), ("b", ramp(0.0))]);
        let current = float_dataset(&[("a", ramp(0.0))]);
        let err = DriftDetector::new().detect(&base, &current).unwrap_err();
        assert!(matches!(err, GuardError::SchemaMismatch { column } if column == "b"));
    }

    #[test]
    fn test_extra_current_column_is_ignored() {
        let base = float_dataset(&[("a", ramp(0.0))]);
        let current = float_dataset(&[("a", ramp(0.0)), ("z", ramp(9.0))]);
        let outcome = DriftDetector::new().detect(&base, &current).unwrap();
        assert_eq!(outcome.report.column_names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_all_null_column_is_statistical_error() {
        let base = float_dataset(&[("a", vec![None, None])]);
        let current = float_dataset(&[("a", ramp(0.0))]);
        let err = DriftDetector::new().detect(&base, &current).unwrap_err();
        assert!(matches!(
            err,
            GuardError::StatisticalComputation {
                source: KsError::EmptySample { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_text_column_is_statistical_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("city", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["Oslo", "Lima"])) as ArrayRef],
        )
        .unwrap();
        let ds = Dataset::new(batch);

        let err = DriftDetector::new().detect(&ds, &ds).unwrap_err();
        match err {
            GuardError::StatisticalComputation { column, source } => {
                assert_eq!(column, "city");
                assert!(matches!(source, KsError::NonNumeric { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detect_dataset_drift_writes_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("drift_report").join("report.yaml");
        let ds = float_dataset(&[("a", ramp(0.0))]);

        let outcome = detect_dataset_drift(&ds, &ds, DEFAULT_DRIFT_THRESHOLD, &path).unwrap();
        assert!(outcome.status);
        assert_eq!(DriftReport::read_yaml(&path).unwrap(), outcome.report);
    }
}
