//! Rendering of drift reports for consoles, CI logs and documentation.
//!
//! The persisted YAML report is the machine contract. These formatters are
//! for people reading a run's outcome.
//!
//! # Examples
//!
//! ```rust
//! use drift_guard::drift::{ColumnDrift, DriftReport};
//! use drift_guard::formatters::{FormatterConfig, HumanFormatter, ReportFormatter};
//!
//! let mut report = DriftReport::new();
//! report.insert("URL_Length", ColumnDrift { p_value: 0.42, drift_detected: false });
//!
//! let formatter = HumanFormatter::with_config(FormatterConfig::plain());
//! let output = formatter.format(&report).unwrap();
//! assert!(output.contains("URL_Length"));
//! ```

use crate::drift::{ColumnDrift, DriftReport};
use crate::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Configuration options for formatting drift reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether to use ANSI colors (human formatter only)
    pub use_colors: bool,
    /// Only list columns flagged as drifted
    pub only_drifted: bool,
    /// Maximum number of columns to list (-1 for all)
    pub max_columns: i32,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            only_drifted: false,
            max_columns: -1,
        }
    }
}

impl FormatterConfig {
    /// No colors, all columns.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    /// A configuration suitable for CI logs: no colors, drifted columns only.
    pub fn ci() -> Self {
        Self {
            use_colors: false,
            only_drifted: true,
            max_columns: 50,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_only_drifted(mut self, only_drifted: bool) -> Self {
        self.only_drifted = only_drifted;
        self
    }

    pub fn with_max_columns(mut self, max: i32) -> Self {
        self.max_columns = max;
        self
    }
}

/// Formats a drift report into a string.
pub trait ReportFormatter {
    fn format(&self, report: &DriftReport) -> Result<String>;
}

fn selected_columns<'a>(
    report: &'a DriftReport,
    config: &FormatterConfig,
) -> Vec<(&'a str, &'a ColumnDrift)> {
    let iter = report
        .iter()
        .filter(|(_, d)| !config.only_drifted || d.drift_detected);
    if config.max_columns < 0 {
        iter.collect()
    } else {
        iter.take(config.max_columns as usize).collect()
    }
}

/// Formats the report as JSON, honouring the column selection of the config.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::plain(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonView<'a> {
    stable: bool,
    drifted: usize,
    total: usize,
    columns: BTreeMap<&'a str, &'a ColumnDrift>,
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        let view = JsonView {
            stable: report.is_stable(),
            drifted: report.drifted_columns().len(),
            total: report.len(),
            columns: selected_columns(report, &self.config).into_iter().collect(),
        };
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&view)
        } else {
            serde_json::to_string(&view)
        };
        encoded.map_err(|e| GuardError::Serialization(format!("Failed to encode report as JSON: {e}")))
    }
}

/// Console output with a verdict line and one line per column.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        let config = &self.config;
        let mut output = String::new();
        let drifted = report.drifted_columns().len();

        writeln!(output).unwrap();
        match (report.is_stable(), config.use_colors) {
            (true, true) => writeln!(output, "✅ \x1b[32mNo drift detected\x1b[0m").unwrap(),
            (true, false) => writeln!(output, "✅ No drift detected").unwrap(),
            (false, true) => writeln!(output, "❌ \x1b[31mDrift detected\x1b[0m").unwrap(),
            (false, false) => writeln!(output, "❌ Drift detected").unwrap(),
        }
        writeln!(output, "   Columns tested: {}", report.len()).unwrap();
        writeln!(output, "   Drifted: {drifted}").unwrap();

        let columns = selected_columns(report, config);
        if !columns.is_empty() {
            writeln!(output).unwrap();
            let width = columns.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, drift) in columns {
                let verdict = match (drift.drift_detected, config.use_colors) {
                    (true, true) => "\x1b[31mDRIFT\x1b[0m",
                    (true, false) => "DRIFT",
                    (false, true) => "\x1b[32mok\x1b[0m",
                    (false, false) => "ok",
                };
                writeln!(
                    output,
                    "   {name:<width$}  p={:<12.6e}  {verdict}",
                    drift.p_value
                )
                .unwrap();
            }
        }

        Ok(output)
    }
}

/// Markdown table, for pasting into pull requests and run notes.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::plain(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &DriftReport) -> Result<String> {
        let mut output = String::new();
        let verdict = if report.is_stable() {
            "✅ No drift"
        } else {
            "❌ Drift detected"
        };
        writeln!(output, "## Drift report: {verdict}").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Column | p-value | Drift |").unwrap();
        writeln!(output, "|--------|---------|-------|").unwrap();
        for (name, drift) in selected_columns(report, &self.config) {
            let flag = if drift.drift_detected { "yes" } else { "no" };
            writeln!(output, "| `{name}` | {:.6} | {flag} |", drift.p_value).unwrap();
        }
        Ok(output)
    }
}
