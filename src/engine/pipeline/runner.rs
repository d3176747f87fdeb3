use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::report::RunReport;
use super::spec::PipelineSpec;
use crate::engine::core::{Resampler, aggregate, align, fill};
use crate::engine::errors::{PipelineError, Stage};
use crate::engine::sink::TableSink;
use crate::engine::source::SeriesSource;
use crate::engine::types::{Column, SensorId, WideTable};
use crate::shared::cancel::CancellationToken;

/// Result of a successful run.
#[derive(Debug)]
pub struct RunOutput {
    pub table: WideTable,
    pub report: RunReport,
}

struct SensorSlice {
    sensor: SensorId,
    column: Column,
    empty: bool,
}

/// Drives one slicing run from a source to a sink.
pub struct Pipeline {
    spec: PipelineSpec,
    source: Box<dyn SeriesSource>,
    sink: Box<dyn TableSink>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(spec: PipelineSpec, source: Box<dyn SeriesSource>, sink: Box<dyn TableSink>) -> Self {
        Self {
            spec,
            source,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    /// Computes and writes the table. Nothing is written if any stage fails
    /// or the run is cancelled. A failed write returns the table inside
    /// [`PipelineError::SinkFailure`].
    pub async fn run(&self) -> Result<RunOutput, PipelineError> {
        let started = Instant::now();
        let (table, mut report) = self.compute().await?;

        self.check_cancelled(Stage::Write)?;
        let table = self.write(table).await?;

        report.elapsed = started.elapsed();
        report.log();
        Ok(RunOutput { table, report })
    }

    /// Every stage except the write.
    pub async fn compute(&self) -> Result<(WideTable, RunReport), PipelineError> {
        let started = Instant::now();
        let resampler = Resampler::new(self.spec.window(), self.spec.period());

        info!(
            target: "sensor_slicer::pipeline",
            sensors = self.spec.sensors().len(),
            start = %self.spec.window().start(),
            end = %self.spec.window().end(),
            period = %self.spec.period().as_delta(),
            factor = self.spec.factor().get(),
            source = %self.source.describe(),
            "Starting run"
        );

        let slices: Vec<SensorSlice> = stream::iter(self.spec.sensors())
            .map(|sensor| self.slice_sensor(&resampler, sensor))
            .buffered(self.spec.fetch_concurrency())
            .try_collect()
            .await?;

        let mut report = RunReport {
            sensors: slices.len(),
            fine_rows: resampler.grid().len(),
            ..RunReport::default()
        };
        let mut columns = IndexMap::with_capacity(slices.len());
        for slice in slices {
            if slice.empty {
                report.empty_series.push(slice.sensor.clone());
            }
            columns.insert(slice.sensor, slice.column);
        }

        self.check_cancelled(Stage::Align)?;
        let fine = align(columns)?;
        let mut table = aggregate(&fine, self.spec.factor());
        let filled = fill(&mut table);

        report.output_rows = table.row_count();
        report.filled_cells = filled.filled;
        report.unresolved_cells = filled.unresolved;
        report.elapsed = started.elapsed();

        debug!(
            target: "sensor_slicer::pipeline",
            fine_rows = report.fine_rows,
            output_rows = report.output_rows,
            "Computed table"
        );
        Ok((table, report))
    }

    /// Writes `table` to the sink, handing it back on success. On failure the
    /// table travels inside the error so the caller can retry.
    pub async fn write(&self, table: WideTable) -> Result<WideTable, PipelineError> {
        let name = self.spec.table_name();
        match self.sink.write(name, &table).await {
            Ok(()) => {
                info!(
                    target: "sensor_slicer::pipeline",
                    table = name,
                    rows = table.row_count(),
                    sink = %self.sink.describe(),
                    "Table written"
                );
                Ok(table)
            }
            Err(source) => Err(PipelineError::SinkFailure {
                table: name.to_string(),
                source,
                retained: Box::new(table),
            }),
        }
    }

    async fn slice_sensor(
        &self,
        resampler: &Resampler,
        sensor: &SensorId,
    ) -> Result<SensorSlice, PipelineError> {
        self.check_cancelled(Stage::Fetch)?;

        let observations = self
            .source
            .fetch(sensor, &self.spec.window())
            .await
            .map_err(|e| PipelineError::from_source(sensor, e))?;

        let empty = observations.is_empty();
        let observations = if empty {
            warn!(
                target: "sensor_slicer::pipeline",
                sensor = %sensor,
                "No observations in window, substituting zeros"
            );
            resampler.boundary_pair()
        } else {
            observations
        };

        let column = resampler.resample(sensor, &observations)?;
        debug!(
            target: "sensor_slicer::pipeline",
            sensor = %sensor,
            observations = observations.len(),
            "Sensor resampled"
        );
        Ok(SensorSlice {
            sensor: sensor.clone(),
            column,
            empty,
        })
    }

    fn check_cancelled(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { stage });
        }
        Ok(())
    }
}
