//! Destinations for finished wide tables.

use async_trait::async_trait;

use crate::engine::errors::SinkError;
use crate::engine::types::WideTable;
use crate::shared::config::{SinkConfig, SinkKind};

pub mod columnar;
pub mod csv;
pub mod sqlite;

#[cfg(test)]
mod columnar_test;
#[cfg(test)]
mod csv_test;

pub use self::columnar::ColumnarSink;
pub use self::csv::CsvSink;
pub use self::sqlite::SqliteSink;

/// Persists a complete table. Sinks borrow the table so the caller still
/// owns it if the write fails.
#[async_trait]
pub trait TableSink: Send + Sync {
    async fn write(&self, table_name: &str, table: &WideTable) -> Result<(), SinkError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

pub async fn open_sink(cfg: &SinkConfig) -> Result<Box<dyn TableSink>, SinkError> {
    Ok(match cfg.kind {
        SinkKind::Csv => Box::new(CsvSink::new(cfg.path.clone())),
        SinkKind::Sqlite => Box::new(SqliteSink::connect(&cfg.path).await?),
        SinkKind::Columnar => Box::new(ColumnarSink::open(&cfg.path)?),
    })
}

/// Runs blocking sink I/O off the async executor.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, SinkError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SinkError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SinkError::Io(std::io::Error::other(e)))?
}
