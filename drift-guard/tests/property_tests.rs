//! Property-based tests for structural checks, the KS test and drift detection.
//!
//! Datasets are generated directly as Arrow batches so the properties can be
//! checked against independently computed expectations.

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use drift_guard::dataset::Dataset;
use drift_guard::drift::{ks_2samp, DriftDetector, KsMethod};
use drift_guard::schema::{ColumnSpec, SchemaDefinition};
use drift_guard::validators::{validate_column_count, validate_numerical_columns};
use proptest::prelude::*;
use std::sync::Arc;

fn float_dataset(columns: &[Vec<f64>]) -> Dataset {
    let fields: Vec<Field> = (0..columns.len())
        .map(|i| Field::new(format!("c{i}"), DataType::Float64, false))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|values| Arc::new(Float64Array::from(values.clone())) as ArrayRef)
        .collect();
    Dataset::new(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap())
}

fn declared(n: usize) -> Vec<ColumnSpec> {
    (0..n)
        .map(|i| ColumnSpec {
            name: format!("c{i}"),
            dtype: None,
        })
        .collect()
}

fn sample(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, 1..max_len)
}

/// Equal-length columns for a base and a current dataset.
fn paired_columns() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    (1usize..4, 2usize..30, 2usize..30).prop_flat_map(|(cols, n1, n2)| {
        (
            prop::collection::vec(prop::collection::vec(-10.0f64..10.0, n1), cols),
            prop::collection::vec(prop::collection::vec(-10.0f64..10.0, n2), cols),
        )
    })
}

// ============================================================================
// KS test
// ============================================================================

proptest! {
    #[test]
    fn test_ks_outputs_are_bounded(a in sample(60), b in sample(60)) {
        for method in [KsMethod::Exact, KsMethod::Asymptotic] {
            let result = ks_2samp(&a, &b, method).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.statistic));
            prop_assert!((0.0..=1.0).contains(&result.p_value));
        }
    }

    #[test]
    fn test_ks_is_symmetric(a in sample(40), b in sample(40)) {
        let ab = ks_2samp(&a, &b, KsMethod::Exact).unwrap();
        let ba = ks_2samp(&b, &a, KsMethod::Exact).unwrap();
        prop_assert!((ab.statistic - ba.statistic).abs() < 1e-12);
        prop_assert!((ab.p_value - ba.p_value).abs() < 1e-9);
    }

    #[test]
    fn test_identical_samples_have_unit_p_value(a in sample(80)) {
        let result = ks_2samp(&a, &a, KsMethod::Auto).unwrap();
        prop_assert_eq!(result.statistic, 0.0);
        prop_assert_eq!(result.p_value, 1.0);
    }
}

// ============================================================================
// Drift detection
// ============================================================================

proptest! {
    #[test]
    fn test_report_keys_equal_base_columns((base, current) in paired_columns()) {
        let base = float_dataset(&base);
        let current = float_dataset(&current);

        let outcome = DriftDetector::new().detect(&base, &current).unwrap();

        let mut expected = base.column_names();
        expected.sort();
        let keys: Vec<String> = outcome.report.column_names().map(String::from).collect();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(outcome.status, outcome.report.is_stable());
    }

    #[test]
    fn test_raising_threshold_never_clears_drift(
        (base, current) in paired_columns(),
        low in 0.0f64..0.5,
        delta in 0.0f64..0.5,
    ) {
        let base = float_dataset(&base);
        let current = float_dataset(&current);
        let high = low + delta;

        let strict = DriftDetector::new().with_threshold(low).detect(&base, &current).unwrap();
        let loose = DriftDetector::new().with_threshold(high).detect(&base, &current).unwrap();

        for column in strict.report.drifted_columns() {
            prop_assert!(loose.report.get(column).unwrap().drift_detected);
        }
        if !strict.status {
            prop_assert!(!loose.status);
        }
    }

    #[test]
    fn test_self_comparison_never_drifts(
        (base, _) in paired_columns(),
        threshold in 0.0f64..1.0,
    ) {
        let base = float_dataset(&base);
        let outcome = DriftDetector::new().with_threshold(threshold).detect(&base, &base).unwrap();
        prop_assert!(outcome.status);
    }
}

// ============================================================================
// Structural checks
// ============================================================================

proptest! {
    #[test]
    fn test_column_count_is_exact_equality(actual in 1usize..40, expected in 1usize..40) {
        let dataset = float_dataset(&vec![vec![0.0]; actual]);
        let schema = SchemaDefinition::new(declared(expected), Vec::<String>::new());
        prop_assert_eq!(validate_column_count(&dataset, &schema), actual == expected);
    }

    #[test]
    fn test_numeric_subset_passes_and_text_column_fails(
        cols in 1usize..10,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut fields: Vec<Field> = (0..cols)
            .map(|i| Field::new(format!("c{i}"), DataType::Float64, false))
            .collect();
        fields.push(Field::new("label", DataType::Utf8, false));
        let mut arrays: Vec<ArrayRef> = (0..cols)
            .map(|_| Arc::new(Float64Array::from(vec![1.0])) as ArrayRef)
            .collect();
        arrays.push(Arc::new(StringArray::from(vec!["x"])));
        let dataset = Dataset::new(
            RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap(),
        );

        let required: Vec<String> = picks.iter().map(|p| format!("c{}", p.index(cols))).collect();
        let subset = SchemaDefinition::new(declared(cols + 1), required.clone());
        prop_assert!(validate_numerical_columns(&dataset, &subset));

        let mut with_text = required;
        with_text.push("label".to_string());
        let text = SchemaDefinition::new(declared(cols + 1), with_text);
        prop_assert!(!validate_numerical_columns(&dataset, &text));
    }
}
