use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::run_blocking;
use crate::engine::materialize::{ColumnarStore, ColumnarStoreError};
use crate::engine::types::WideTable;
use crate::shared::cancel::{CancellationToken, sleep_unless_cancelled};
use crate::shared::config::ReplayConfig;

/// Re-emits the rows of a stored table one at a time, stamped with the
/// current time, into a target table.
#[derive(Debug, Clone)]
pub struct Replayer {
    store: ColumnarStore,
    source_table: String,
    target_table: String,
    interval: Duration,
    repeat: bool,
}

impl Replayer {
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
            repeat: true,
        }
    }

    pub fn from_config(cfg: &ReplayConfig) -> Result<Self, ColumnarStoreError> {
        let store = ColumnarStore::open(&cfg.root)?;
        Ok(Self::new(
            store,
            cfg.source_table.clone(),
            cfg.target_table.clone(),
            cfg.interval,
        )
        .with_repeat(cfg.repeat))
    }

    /// When false, stop after the last source row instead of wrapping around.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Runs until cancelled (or, without repeat, until the source is
    /// exhausted). Returns the number of rows appended to the target.
    ///
    /// The token is checked between rows only, so an append in progress is
    /// always completed.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<u64, ColumnarStoreError> {
        let store = self.store.clone();
        let source_table = self.source_table.clone();
        let rows = run_blocking(move || store.existing_table(&source_table)?.read_all()).await?;
        if rows.is_empty() {
            warn!(
                target: "sensor_slicer::replay",
                table = %self.source_table,
                "Source table has no rows, nothing to replay"
            );
            return Ok(0);
        }

        let store = self.store.clone();
        let target_table = self.target_table.clone();
        let mut target = run_blocking(move || store.table(&target_table)).await?;
        info!(
            target: "sensor_slicer::replay",
            source = %self.source_table,
            target = %self.target_table,
            rows = rows.row_count(),
            interval_ms = self.interval.as_millis() as u64,
            "Replay started"
        );

        let mut inserted = 0u64;
        'outer: loop {
            for idx in 0..rows.row_count() {
                if cancel.is_cancelled() {
                    break 'outer;
                }
                let Some((_, values)) = rows.row(idx) else {
                    break;
                };

                let mut single = WideTable::empty(rows.schema().clone());
                single
                    .push_row(Utc::now(), &values)
                    .map_err(ColumnarStoreError::SchemaMismatch)?;
                target = run_blocking(move || {
                    target.append(&single)?;
                    Ok(target)
                })
                .await?;
                inserted += 1;
                debug!(target: "sensor_slicer::replay", row = idx, "Row replayed");

                if !sleep_unless_cancelled(cancel, self.interval).await {
                    break 'outer;
                }
            }
            if !self.repeat {
                break;
            }
        }

        info!(target: "sensor_slicer::replay", inserted, "Replay stopped");
        Ok(inserted)
    }
}
