//! Structural checks run before drift detection.

mod structural;

pub use structural::{
    missing_numerical_columns, validate_column_count, validate_numerical_columns, CheckResult,
    CheckStatus, StructuralReport, StructuralValidator,
};
