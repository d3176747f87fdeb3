use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::run_blocking;
use crate::engine::materialize::{ColumnarStore, ColumnarStoreError};
use crate::engine::types::{SensorId, TableSchema, WideTable};
use crate::shared::cancel::{CancellationToken, sleep_unless_cancelled};
use crate::shared::config::RowSumConfig;

/// Value column of the row-sum table.
pub const SUM_COLUMN: &str = "sum";

/// Sum of the non-`NaN` values; zero when there are none.
pub fn nan_sum(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}

/// Periodically sums the newest row of a table into `(timestamp, sum)` rows.
#[derive(Debug, Clone)]
pub struct RowSummer {
    store: ColumnarStore,
    source_table: String,
    target_table: String,
    interval: Duration,
}

impl RowSummer {
    pub fn new(
        store: ColumnarStore,
        source_table: impl Into<String>,
        target_table: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            source_table: source_table.into(),
            target_table: target_table.into(),
            interval,
        }
    }

    pub fn from_config(cfg: &RowSumConfig) -> Result<Self, ColumnarStoreError> {
        let store = ColumnarStore::open(&cfg.root)?;
        Ok(Self::new(
            store,
            cfg.source_table.clone(),
            cfg.target_table.clone(),
            cfg.interval,
        ))
    }

    /// Sums the current last row of the source table and appends it, unless
    /// that row was already summed (`after`). A missing or empty source is
    /// not an error.
    pub fn step(
        &self,
        after: Option<DateTime<Utc>>,
    ) -> Result<Option<(DateTime<Utc>, f64)>, ColumnarStoreError> {
        let source = match self.store.existing_table(&self.source_table) {
            Ok(table) => table,
            Err(ColumnarStoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some((timestamp, values)) = source.last_row()? else {
            return Ok(None);
        };
        if after.is_some_and(|seen| timestamp <= seen) {
            return Ok(None);
        }

        let sum = nan_sum(&values);
        let schema = TableSchema::for_sensors([&SensorId::from(SUM_COLUMN)]);
        let mut row = WideTable::empty(schema);
        row.push_row(timestamp, &[sum])
            .map_err(ColumnarStoreError::SchemaMismatch)?;
        self.store.table(&self.target_table)?.append(&row)?;

        debug!(target: "sensor_slicer::row_sum", %timestamp, sum, "Row summed");
        Ok(Some((timestamp, sum)))
    }

    /// Calls [`step`](Self::step) every interval until cancelled. Returns the
    /// number of sums appended.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<u64, ColumnarStoreError> {
        info!(
            target: "sensor_slicer::row_sum",
            source = %self.source_table,
            target = %self.target_table,
            "Row sum started"
        );
        let mut last_seen = None;
        let mut appended = 0u64;
        while !cancel.is_cancelled() {
            let summer = self.clone();
            if let Some((timestamp, _)) = run_blocking(move || summer.step(last_seen)).await? {
                last_seen = Some(timestamp);
                appended += 1;
            }
            if !sleep_unless_cancelled(cancel, self.interval).await {
                break;
            }
        }
        info!(target: "sensor_slicer::row_sum", appended, "Row sum stopped");
        Ok(appended)
    }
}
