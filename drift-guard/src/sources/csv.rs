//! CSV file source implementation.

use super::DataSource;
use crate::dataset::Dataset;
use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
        }
    }
}

/// A single CSV file read through DataFusion with schema inference.
///
/// Column types come from inference over the first
/// [`CsvOptions::schema_infer_max_records`] rows, so a column that mixes
/// numbers and text is read as text.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a single file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: CsvOptions::default(),
        }
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_extension(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self), fields(
        dataset.path = %self.path.display(),
        source.type = "csv",
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn load(&self) -> Result<Dataset> {
        info!(dataset.path = %self.path.display(), "Reading CSV dataset");

        // DataFusion reports a missing file as a planning error; surface it as I/O.
        tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| GuardError::io(&self.path, e))?;

        let path_str = self.path.to_str().ok_or_else(|| {
            GuardError::data_source("CSV", format!("Path {:?} is not valid UTF-8", self.path))
        })?;

        let extension = self.file_extension();
        let csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);

        let ctx = SessionContext::new();
        let df = ctx.read_csv(path_str, csv_options).await.map_err(|e| {
            GuardError::data_source_with_source(
                "CSV",
                format!("Failed to open {}", self.path.display()),
                Box::new(e),
            )
        })?;

        let schema = df.schema().inner().clone();
        let batches = df.collect().await.map_err(|e| {
            GuardError::data_source_with_source(
                "CSV",
                format!("Failed to parse {}", self.path.display()),
                Box::new(e),
            )
        })?;
        let dataset = Dataset::from_batches(schema, &batches)?;

        debug!(
            dataset.path = %self.path.display(),
            dataset.rows = dataset.num_rows(),
            dataset.columns = dataset.num_columns(),
            "CSV dataset loaded"
        );
        Ok(dataset)
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }
}
