//! Prelude for commonly used types and traits in drift-guard.

pub use crate::dataset::Dataset;
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::DataSource;
