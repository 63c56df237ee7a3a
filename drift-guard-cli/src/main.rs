//! drift-guard command line
//!
//! Runs the data validation stage over an ingested train/test split, renders
//! persisted drift reports and exports CSV rows to a document sink.
//!
//! Exit codes: `0` validation passed, `1` the run failed with an error,
//! `2` the run completed but validation did not pass.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use drift_guard::artifact::DataIngestionArtifact;
use drift_guard::config::{
    DataValidationConfig, StructuralPolicy, TrainingPipelineConfig, ARTIFACT_DIR, SCHEMA_FILE_PATH,
};
use drift_guard::drift::{DriftReport, DEFAULT_DRIFT_THRESHOLD};
use drift_guard::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
use drift_guard::logging::setup::{init_logging, LoggingConfig};
use drift_guard::logging::LogConfig;
use drift_guard::pipeline::DataValidation;
use drift_guard::records::{dataset_to_records, DocumentSink, JsonLinesSink};
use drift_guard::sources::{CsvSource, DataSource};
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log debug output from drift-guard components, including per-column drift tests
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an ingested train/test split
    Validate {
        /// Training split produced by ingestion
        #[arg(long)]
        train: PathBuf,

        /// Test split produced by ingestion
        #[arg(long)]
        test: PathBuf,

        /// Schema file declaring columns and numerical columns
        #[arg(long, default_value = SCHEMA_FILE_PATH)]
        schema: PathBuf,

        /// Root under which the timestamped run directory is created
        #[arg(long, default_value = ARTIFACT_DIR)]
        artifact_dir: PathBuf,

        /// Significance level below which a column is flagged as drifted
        #[arg(long, default_value_t = DEFAULT_DRIFT_THRESHOLD, value_parser = parse_threshold)]
        threshold: f64,

        /// Fail validation when a structural check fails
        #[arg(long)]
        gate_structure: bool,

        /// How to print the drift report
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },

    /// Render a persisted drift report
    Report {
        /// Path to a report.yaml written by a validation run
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,

        /// Only list drifted columns
        #[arg(long)]
        only_drifted: bool,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },

    /// Export CSV rows as JSON records into a JSON-lines document store
    ExportRecords {
        /// CSV file to export
        #[arg(long)]
        input: PathBuf,

        /// Directory holding the document store
        #[arg(long)]
        root: PathBuf,

        #[arg(long)]
        database: String,

        #[arg(long)]
        collection: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
    Markdown,
}

fn render(report: &DriftReport, format: Format, config: FormatterConfig) -> Result<String> {
    let output = match format {
        Format::Human => HumanFormatter::with_config(config).format(report)?,
        Format::Json => JsonFormatter::with_config(config).format(report)?,
        Format::Markdown => MarkdownFormatter::with_config(config).format(report)?,
    };
    Ok(output)
}

fn parse_threshold(value: &str) -> std::result::Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|e| format!("'{value}' is not a number: {e}"))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("{value} is not in [0, 1]"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default().with_json_format(args.json_logs);
    if !args.verbose {
        logging = logging.with_guard_level(tracing::Level::INFO);
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let code = run(args).await?;
    if code != 0 {
        process::exit(code);
    }
    Ok(())
}

/// Executes one subcommand and returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let log_config = if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };

    match args.command {
        Command::Validate {
            train,
            test,
            schema,
            artifact_dir,
            threshold,
            gate_structure,
            format,
        } => {
            let pipeline = TrainingPipelineConfig::with_artifact_root(&artifact_dir, chrono::Local::now());
            let policy = if gate_structure {
                StructuralPolicy::Gate
            } else {
                StructuralPolicy::Permissive
            };
            let config = DataValidationConfig::new(&pipeline)
                .with_schema_file(schema)
                .with_drift_threshold(threshold)
                .with_structural_policy(policy);
            let artifact_path = config.data_validation_dir.join("artifact.json");

            let stage = DataValidation::new(DataIngestionArtifact::new(train, test), config)
                .context("failed to set up data validation")?
                .with_log_config(log_config);
            let artifact = stage.initiate_data_validation().await?;
            artifact.write_json(&artifact_path)?;

            let report = DriftReport::read_yaml(&artifact.drift_report_file_path)?;
            print!("{}", render(&report, format, FormatterConfig::default())?);
            for structural in &artifact.structural_reports {
                for failure in structural.failures() {
                    println!(
                        "   structural: {} {}: {}",
                        structural.dataset,
                        failure.check,
                        failure.message.as_deref().unwrap_or_default()
                    );
                }
            }
            println!("{}", serde_json::to_string_pretty(&artifact)?);
            info!(artifact.path = %artifact_path.display(), "Wrote validation artifact");

            if !artifact.validation_status {
                return Ok(2);
            }
        }
        Command::Report {
            path,
            format,
            only_drifted,
            no_color,
        } => {
            let report = DriftReport::read_yaml(&path)
                .with_context(|| format!("failed to read drift report {}", path.display()))?;
            let config = FormatterConfig::default()
                .with_colors(!no_color)
                .with_only_drifted(only_drifted);
            print!("{}", render(&report, format, config)?);
        }
        Command::ExportRecords {
            input,
            root,
            database,
            collection,
        } => {
            let dataset = CsvSource::new(&input).load().await?;
            let records = dataset_to_records(&dataset)?;
            let sink = JsonLinesSink::new(root);
            let inserted = sink.insert_many(&database, &collection, &records).await?;
            println!(
                "Inserted {inserted} records into {}",
                sink.collection_path(&database, &collection).display()
            );
        }
    }

    Ok(0)
}
