//! Common test fixtures for validation scenarios.
//!
//! Generators are seeded so a fixture built twice with the same arguments
//! yields the same rows.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{ColumnSpec, SchemaDefinition};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Feature columns of the phishing-website dataset, label last.
pub const PHISHING_COLUMNS: [&str; 31] = [
    "having_IP_Address",
    "URL_Length",
    "Shortining_Service",
    "having_At_Symbol",
    "double_slash_redirecting",
    "Prefix_Suffix",
    "having_Sub_Domain",
    "SSLfinal_State",
    "Domain_registeration_length",
    "Favicon",
    "port",
    "HTTPS_token",
    "Request_URL",
    "URL_of_Anchor",
    "Links_in_tags",
    "SFH",
    "Submitting_to_email",
    "Abnormal_URL",
    "Redirect",
    "on_mouseover",
    "RightClick",
    "popUpWidnow",
    "Iframe",
    "age_of_domain",
    "DNSRecord",
    "web_traffic",
    "Page_Rank",
    "Google_Index",
    "Links_pointing_to_page",
    "Statistical_report",
    "Result",
];

/// Float64 columns, each drawn uniformly from its own `[low, high)` range.
pub fn uniform_dataset(columns: &[(&str, f64, f64)], rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, _, _)| Field::new(*name, DataType::Float64, false))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|(_, low, high)| {
            let values: Vec<f64> = (0..rows).map(|_| rng.random_range(*low..*high)).collect();
            Arc::new(Float64Array::from(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .expect("fixture columns share a length");
    Dataset::new(batch)
}

/// Int64 columns with values in `{-1, 0, 1}`, shaped like the phishing dataset.
pub fn phishing_dataset(columns: &[&str], rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(*name, DataType::Int64, false))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|_| {
            let values: Vec<i64> = (0..rows).map(|_| rng.random_range(-1..=1)).collect();
            Arc::new(Int64Array::from(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .expect("fixture columns share a length");
    Dataset::new(batch)
}

/// A schema declaring `columns` as int64 and requiring `numerical` to be numeric.
pub fn schema_for(columns: &[&str], numerical: &[&str]) -> SchemaDefinition {
    let specs = columns
        .iter()
        .map(|name| ColumnSpec {
            name: name.to_string(),
            dtype: Some("int64".to_string()),
        })
        .collect();
    SchemaDefinition::new(specs, numerical.iter().copied())
}

/// Writes a schema YAML file to `dir/schema.yaml` and returns its path.
pub fn write_schema_yaml(dir: &Path, columns: &[&str], numerical: &[&str]) -> Result<PathBuf> {
    let mut text = String::from("columns:\n");
    for name in columns {
        text.push_str(&format!("  - {name}: int64\n"));
    }
    text.push_str(if numerical.is_empty() {
        "numerical_columns: []\n"
    } else {
        "numerical_columns:\n"
    });
    for name in numerical {
        text.push_str(&format!("  - {name}\n"));
    }

    let path = dir.join("schema.yaml");
    std::fs::write(&path, text).map_err(|e| crate::error::GuardError::io(&path, e))?;
    Ok(path)
}

/// Writes `dataset` as CSV to `dir/name` and returns the path.
pub fn write_dataset(dir: &Path, name: &str, dataset: &Dataset) -> Result<PathBuf> {
    let path = dir.join(name);
    dataset.write_csv(&path)?;
    Ok(path)
}
