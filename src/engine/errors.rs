use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};

use crate::engine::materialize::ColumnarStoreError;
use crate::engine::types::{SensorId, WideTable};

/// Pipeline stage, used to report where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Fetch,
    Resample,
    Align,
    Aggregate,
    GapFill,
    Write,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Fetch => "fetch",
            Stage::Resample => "resample",
            Stage::Align => "align",
            Stage::Aggregate => "aggregate",
            Stage::GapFill => "gap_fill",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised by an observation source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Delimited file error: {0}")]
    Csv(#[from] csv::Error),

    /// Data could be read but not interpreted.
    #[error("Malformed data: {0}")]
    Malformed(String),
}

/// Failures raised while writing or reading back a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Columnar store error: {0}")]
    Store(#[from] ColumnarStoreError),

    #[error("Schema error: {0}")]
    Schema(String),
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable for sensor {sensor}: {source}")]
    SourceUnavailable {
        sensor: SensorId,
        #[source]
        source: SourceError,
    },

    #[error("Malformed series for sensor {sensor}: {reason}")]
    MalformedSeries { sensor: SensorId, reason: String },

    #[error("Misaligned column {sensor}: {reason}")]
    MisalignedColumns { sensor: SensorId, reason: String },

    /// The computed table is kept so the caller can retry the write.
    #[error("Sink '{table}' failed: {source}")]
    SinkFailure {
        table: String,
        #[source]
        source: SinkError,
        retained: Box<WideTable>,
    },

    #[error("Run cancelled during {stage}")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    /// Maps a source failure onto the pipeline error for `sensor`.
    /// Malformed data is a series problem, everything else means the
    /// source could not be reached or read.
    pub fn from_source(sensor: &SensorId, err: SourceError) -> Self {
        match err {
            SourceError::Malformed(reason) => PipelineError::MalformedSeries {
                sensor: sensor.clone(),
                reason,
            },
            other => PipelineError::SourceUnavailable {
                sensor: sensor.clone(),
                source: other,
            },
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidWindow { .. } | PipelineError::Config(_) => Stage::Config,
            PipelineError::SourceUnavailable { .. } => Stage::Fetch,
            PipelineError::MalformedSeries { .. } => Stage::Resample,
            PipelineError::MisalignedColumns { .. } => Stage::Align,
            PipelineError::SinkFailure { .. } => Stage::Write,
            PipelineError::Cancelled { stage } => *stage,
        }
    }

    /// Takes the retained table out of a sink failure; any other error is
    /// handed back unchanged.
    pub fn into_retained(self) -> Result<WideTable, PipelineError> {
        match self {
            PipelineError::SinkFailure { retained, .. } => Ok(*retained),
            other => Err(other),
        }
    }

    pub fn log_error(&self) {
        match self {
            PipelineError::InvalidWindow { start, end } => {
                error!(target: "sensor_slicer::pipeline", %start, %end, "Invalid window");
            }
            PipelineError::Config(msg) => {
                error!(target: "sensor_slicer::pipeline", "Configuration error: {}", msg);
            }
            PipelineError::SourceUnavailable { sensor, source } => {
                error!(target: "sensor_slicer::pipeline", sensor = %sensor, "Source unavailable: {}", source);
                debug!(target: "sensor_slicer::pipeline", "Source error details: {:?}", source);
            }
            PipelineError::MalformedSeries { sensor, reason } => {
                error!(target: "sensor_slicer::pipeline", sensor = %sensor, "Malformed series: {}", reason);
            }
            PipelineError::MisalignedColumns { sensor, reason } => {
                error!(target: "sensor_slicer::pipeline", sensor = %sensor, "Misaligned column: {}", reason);
            }
            PipelineError::SinkFailure {
                table,
                source,
                retained,
            } => {
                error!(
                    target: "sensor_slicer::pipeline",
                    table = %table,
                    rows = retained.row_count(),
                    "Sink write failed: {}",
                    source
                );
                debug!(target: "sensor_slicer::pipeline", "Sink error details: {:?}", source);
            }
            PipelineError::Cancelled { stage } => {
                error!(target: "sensor_slicer::pipeline", stage = %stage, "Run cancelled");
            }
        }
    }
}
