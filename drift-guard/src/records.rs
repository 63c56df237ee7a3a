//! Row-record export towards the document store.
//!
//! Ingestion reads its raw data from a document database. This module turns a
//! CSV dataset into one JSON object per row and hands the records to a
//! [`DocumentSink`]. The database client itself lives outside this crate;
//! [`JsonLinesSink`] is a file-backed sink for local runs and tests.

use crate::dataset::Dataset;
use crate::prelude::*;
use arrow::json::writer::JsonArray;
use arrow::json::WriterBuilder;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A single row as a JSON object keyed by column name.
pub type Record = Map<String, Value>;

/// Converts every row of `dataset` into a JSON object.
///
/// Null cells are kept as explicit `null` values.
pub fn dataset_to_records(dataset: &Dataset) -> Result<Vec<Record>> {
    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());
    writer.write(dataset.batch())?;
    writer.finish()?;
    let buf = writer.into_inner();

    if buf.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&buf).context("Failed to decode rows encoded by the JSON writer")
}

/// Destination for exported records.
#[async_trait]
pub trait DocumentSink: Debug + Send + Sync {
    /// Inserts `records` into `collection` of `database`, returning how many were written.
    async fn insert_many(&self, database: &str, collection: &str, records: &[Record])
        -> Result<usize>;
}

/// Appends records as JSON lines to `<root>/<database>/<collection>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    root: PathBuf,
}

impl JsonLinesSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn collection_path(&self, database: &str, collection: &str) -> PathBuf {
        self.root.join(database).join(format!("{collection}.jsonl"))
    }
}

#[async_trait]
impl DocumentSink for JsonLinesSink {
    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        records: &[Record],
    ) -> Result<usize> {
        let path = self.collection_path(database, collection);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GuardError::io(parent, e))?;
        }

        let mut body = String::new();
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|e| GuardError::Serialization(format!("Failed to encode record: {e}")))?;
            body.push_str(&line);
            body.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| GuardError::io(&path, e))?;
        file.write_all(body.as_bytes())
            .await
            .map_err(|e| GuardError::io(&path, e))?;
        file.flush().await.map_err(|e| GuardError::io(&path, e))?;

        info!(
            database,
            collection,
            records = records.len(),
            sink.path = %path.display(),
            "Inserted records"
        );
        Ok(records.len())
    }
}
