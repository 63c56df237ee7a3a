//! In-memory tabular dataset backed by a single Arrow record batch.

use crate::prelude::*;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, concat_batches};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Float64Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// A read-only table of named columns with a stable column order.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps an existing record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenates the batches produced by a reader into one dataset.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(&schema, batches)?;
        Ok(Self { batch })
    }

    /// The underlying Arrow batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Arrow type of a column, if present.
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.batch
            .schema()
            .field_with_name(name)
            .ok()
            .map(|f| f.data_type().clone())
    }

    /// Names of the columns whose runtime type is numeric.
    ///
    /// Integers, unsigned integers, floats and decimals count as numeric.
    /// Booleans and strings do not, whatever their content looks like.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .filter(|f| f.data_type().is_numeric())
            .map(|f| f.name().clone())
            .collect()
    }

    /// Values of a numeric column as `f64`, with nulls and NaN dropped.
    ///
    /// Returns `Ok(None)` when the column exists but is not numeric.
    pub fn numeric_values(&self, name: &str) -> Result<Option<Vec<f64>>> {
        let Some(array) = self.column(name) else {
            return Err(GuardError::SchemaMismatch {
                column: name.to_string(),
            });
        };
        if !array.data_type().is_numeric() {
            return Ok(None);
        }

        let floats = cast(array, &DataType::Float64)?;
        let values = floats
            .as_primitive::<Float64Type>()
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        Ok(Some(values))
    }

    /// Writes the dataset as CSV with a header row and no index column.
    ///
    /// Parent directories are created when missing.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GuardError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| GuardError::io(path, e))?;
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer.write(&self.batch)?;

        debug!(
            dataset.path = %path.display(),
            dataset.rows = self.num_rows(),
            "Wrote dataset CSV"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample() -> Dataset {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("score", DataType::Float64, true),
            Field::new("city", DataType::Utf8, true),
            Field::new("active", DataType::Boolean, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(30), None, Some(41)])),
                Arc::new(Float64Array::from(vec![1.5, f64::NAN, 2.5])),
                Arc::new(StringArray::from(vec!["Oslo", "Lima", "Pune"])),
                Arc::new(BooleanArray::from(vec![true, false, true])),
            ],
        )
        .unwrap();
        Dataset::new(batch)
    }

    #[test]
    fn test_column_metadata() {
        let ds = sample();
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.num_columns(), 4);
        assert_eq!(ds.column_names(), vec!["age", "score", "city", "active"]);
        assert!(ds.has_column("city"));
        assert!(!ds.has_column("income"));
        assert_eq!(ds.data_type("age"), Some(DataType::Int64));
    }

    #[test]
    fn test_numeric_columns_exclude_bool_and_text() {
        assert_eq!(sample().numeric_column_names(), vec!["age", "score"]);
    }

    #[test]
    fn test_numeric_values_drop_nulls_and_nan() {
        let ds = sample();
        assert_eq!(ds.numeric_values("age").unwrap(), Some(vec![30.0, 41.0]));
        assert_eq!(ds.numeric_values("score").unwrap(), Some(vec![1.5, 2.5]));
        assert_eq!(ds.numeric_values("city").unwrap(), None);
        assert!(matches!(
            ds.numeric_values("missing"),
            Err(GuardError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validated").join("train.csv");

        sample().write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("age,score,city,active"));
        assert_eq!(lines.count(), 3);
    }
}
