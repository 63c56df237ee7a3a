//! Distribution drift detection.
//!
//! - [`statistical`]: the two-sample Kolmogorov–Smirnov test
//! - [`DriftDetector`]: per-column comparison of a base and a current dataset
//! - [`DriftReport`]: the persisted, auditable result

mod detector;
mod report;
pub mod statistical;

pub use detector::{detect_dataset_drift, DriftDetector, DriftOutcome, DEFAULT_DRIFT_THRESHOLD};
pub use report::{ColumnDrift, DriftReport};
pub use statistical::{ks_2samp, KsError, KsMethod, KsTestResult};
