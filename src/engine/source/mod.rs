//! Observation sources: where raw `(timestamp, value)` readings come from.

use async_trait::async_trait;

use crate::engine::errors::SourceError;
use crate::engine::types::{Observation, SensorId, TimeWindow};
use crate::shared::config::{SourceConfig, SourceKind};
use crate::shared::time::TimeParser;

pub mod delimited;
pub mod memory;
pub mod sqlite;


pub use delimited::DelimitedSource;
pub use memory::MemorySource;
pub use sqlite::SqliteSource;

/// Yields the raw observations of one sensor.
///
/// Implementations return every observation with a timestamp in the closed
/// range `[window.start(), window.end()]`, sorted ascending, timestamps in UTC.
/// Duplicate timestamps keep their storage order.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch(
        &self,
        sensor: &SensorId,
        window: &TimeWindow,
    ) -> Result<Vec<Observation>, SourceError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Opens the source named by `cfg`.
pub async fn open_source(
    cfg: &SourceConfig,
    parser: TimeParser,
) -> Result<Box<dyn SeriesSource>, SourceError> {
    match cfg.kind {
        SourceKind::Sqlite => {
            let source = SqliteSource::connect(
                &cfg.path,
                &cfg.table,
                cfg.catalog_table.as_deref(),
                cfg.malformed_rows,
                parser,
            )
            .await?;
            Ok(Box::new(source))
        }
        SourceKind::Delimited => {
            let delimiter = single_byte(&cfg.delimiter)?;
            Ok(Box::new(DelimitedSource::new(
                cfg.path.clone(),
                delimiter,
                cfg.has_headers,
                cfg.malformed_rows,
                parser,
            )))
        }
    }
}

fn single_byte(delimiter: &str) -> Result<u8, SourceError> {
    match delimiter.as_bytes() {
        [b] => Ok(*b),
        _ => Err(SourceError::Malformed(format!(
            "delimiter must be a single byte, got {delimiter:?}"
        ))),
    }
}
