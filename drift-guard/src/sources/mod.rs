//! Dataset readers.
//!
//! Readers turn a path on disk into a [`Dataset`]. Row-oriented CSV is the
//! only format the ingestion stage hands over, so [`CsvSource`] is the only
//! implementation today.

use crate::dataset::Dataset;
use crate::prelude::*;
use async_trait::async_trait;
use std::fmt::Debug;

mod csv;

pub use csv::{CsvOptions, CsvSource};

/// A data source that can be materialised into a [`Dataset`].
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::sources::{CsvSource, DataSource};
///
/// # async fn example() -> drift_guard::prelude::Result<()> {
/// let source = CsvSource::new("Artifacts/ingested/train.csv");
/// let dataset = source.load().await?;
/// println!("{} rows", dataset.num_rows());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Reads the whole source into memory.
    async fn load(&self) -> Result<Dataset>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}
