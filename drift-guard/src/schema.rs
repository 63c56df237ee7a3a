//! Schema registry: the declarative shape a dataset must have.
//!
//! Schema files are YAML documents with two required keys:
//!
//! ```yaml
//! columns:
//!   - having_IP_Address: int64
//!   - URL_Length: int64
//!   - Result: int64
//! numerical_columns:
//!   - having_IP_Address
//!   - URL_Length
//!   - Result
//! ```
//!
//! Entries under `columns` may also be bare names when the declared type is
//! not of interest.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Declared type as written in the schema file, if any.
    pub dtype: Option<String>,
}

/// Expected dataset shape, loaded once per validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    columns: Vec<ColumnSpec>,
    numerical_columns: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Name(String),
    Typed(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    columns: Vec<RawColumn>,
    numerical_columns: Vec<String>,
}

impl SchemaDefinition {
    /// Builds a schema from declared columns and required numerical columns.
    pub fn new<I, S>(columns: Vec<ColumnSpec>, numerical_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns,
            numerical_columns: numerical_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads a schema definition from a YAML file.
    ///
    /// Fails with [`GuardError::Config`] when the file is missing, is not
    /// valid YAML, lacks `columns` or `numerical_columns`, or declares the
    /// same column twice.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GuardError::config_with_source(path, "cannot read schema file", Box::new(e))
        })?;
        let schema = Self::from_yaml_str(&text).map_err(|e| match e {
            GuardError::Config {
                message, source, ..
            } => GuardError::Config {
                path: path.to_path_buf(),
                message,
                source,
            },
            other => other,
        })?;

        debug!(
            schema.path = %path.display(),
            schema.columns = schema.total_column_count(),
            schema.numerical = schema.numerical_columns.len(),
            "Loaded schema definition"
        );
        Ok(schema)
    }

    /// Parses a schema definition from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: RawSchema = serde_yaml::from_str(text).map_err(|e| {
            GuardError::config_with_source("<inline>", "malformed schema document", Box::new(e))
        })?;

        let mut columns = Vec::with_capacity(raw.columns.len());
        for entry in raw.columns {
            let spec = match entry {
                RawColumn::Name(name) => ColumnSpec { name, dtype: None },
                RawColumn::Typed(map) => {
                    if map.len() != 1 {
                        return Err(GuardError::config(
                            "<inline>",
                            format!(
                                "column entries must map exactly one name to a type, got {} keys",
                                map.len()
                            ),
                        ));
                    }
                    let (name, dtype) = map.into_iter().next().ok_or_else(|| {
                        GuardError::config("<inline>", "empty column entry")
                    })?;
                    ColumnSpec {
                        name,
                        dtype: Some(dtype),
                    }
                }
            };
            columns.push(spec);
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(GuardError::config(
                    "<inline>",
                    format!("column '{}' is declared more than once", column.name),
                ));
            }
        }

        for name in &raw.numerical_columns {
            if !seen.contains(name.as_str()) {
                warn!(column = %name, "Numerical column is not listed under 'columns'");
            }
        }

        Ok(Self {
            columns,
            numerical_columns: raw.numerical_columns.into_iter().collect(),
        })
    }

    /// Declared columns in file order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Number of declared columns.
    pub fn total_column_count(&self) -> usize {
        self.columns.len()
    }

    /// Names of the columns that must be numerically typed.
    pub fn numerical_column_names(&self) -> &BTreeSet<String> {
        &self.numerical_columns
    }
}
