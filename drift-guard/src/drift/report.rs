//! Drift report model and its YAML persistence.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Per-column drift verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub p_value: f64,
    /// True when `p_value < threshold`
    #[serde(rename = "drift_status")]
    pub drift_detected: bool,
}

/// Mapping from column name to its drift verdict.
///
/// Keys are kept sorted so serialization is deterministic: writing the same
/// report twice yields byte-identical files. The report body carries no
/// timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriftReport {
    columns: BTreeMap<String, ColumnDrift>,
}

impl DriftReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, drift: ColumnDrift) {
        self.columns.insert(column.into(), drift);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDrift> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates columns in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDrift)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns flagged as drifted.
    pub fn drifted_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, d)| d.drift_detected)
            .map(|(name, _)| name)
            .collect()
    }

    /// True when no column drifted.
    pub fn is_stable(&self) -> bool {
        self.columns.values().all(|d| !d.drift_detected)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GuardError::Serialization(format!("Failed to encode drift report: {e}")))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| GuardError::Serialization(format!("Failed to decode drift report: {e}")))
    }

    /// Writes the report as YAML, creating parent directories as needed.
    pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GuardError::io(parent, e))?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(|e| GuardError::io(path, e))?;
        debug!(report.path = %path.display(), report.columns = self.len(), "Wrote drift report");
        Ok(())
    }

    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GuardError::io(path, e))?;
        Self::from_yaml(&text)
    }
}

impl<'a> IntoIterator for &'a DriftReport {
    type Item = (&'a String, &'a ColumnDrift);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ColumnDrift>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> DriftReport {
        let mut report = DriftReport::new();
        report.insert(
            "b",
            ColumnDrift {
                p_value: 0.5,
                drift_detected: false,
            },
        );
        report.insert(
            "a",
            ColumnDrift {
                p_value: 0.001,
                drift_detected: true,
            },
        );
        report
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = sample().to_yaml().unwrap();
        assert_eq!(
            yaml,
            "a:\n  p_value: 0.001\n  drift_status: true\nb:\n  p_value: 0.5\n  drift_status: false\n"
        );
    }

    #[test]
    fn test_drifted_columns() {
        let report = sample();
        assert_eq!(report.drifted_columns(), vec!["a"]);
        assert!(!report.is_stable());
        assert_eq!(report.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drift_report").join("report.yaml");
        let report = sample();

        report.write_yaml(&path).unwrap();
        let first = std::fs::read(&path).unwrap();
        report.write_yaml(&path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(DriftReport::read_yaml(&path).unwrap(), report);
    }

    #[test]
    fn test_read_missing_report() {
        assert!(matches!(
            DriftReport::read_yaml("/nonexistent/report.yaml"),
            Err(GuardError::Io { .. })
        ));
    }
}
