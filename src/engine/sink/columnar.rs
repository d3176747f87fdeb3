use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{TableSink, run_blocking};
use crate::engine::errors::SinkError;
use crate::engine::materialize::ColumnarStore;
use crate::engine::types::WideTable;

/// Appends each written table to the columnar store as a new frame. History
/// accumulates across runs; the first run fixes the table schema.
#[derive(Debug, Clone)]
pub struct ColumnarSink {
    store: ColumnarStore,
}

impl ColumnarSink {
    pub fn open(root: &Path) -> Result<Self, SinkError> {
        Ok(Self {
            store: ColumnarStore::open(root)?,
        })
    }

    pub fn store(&self) -> &ColumnarStore {
        &self.store
    }
}

#[async_trait]
impl TableSink for ColumnarSink {
    async fn write(&self, table_name: &str, table: &WideTable) -> Result<(), SinkError> {
        let store = self.store.clone();
        let name = table_name.to_string();
        let rows = table.row_count();
        let table = table.clone();
        let meta = run_blocking(move || {
            let mut target = store.table(&name)?;
            Ok(target.append(&table)?)
        })
        .await?;

        debug!(
            target: "sensor_slicer::sink",
            table = table_name,
            rows,
            frame = ?meta.map(|m| m.file_name),
            "Appended to columnar store"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("columnar({})", self.store.root().display())
    }
}
