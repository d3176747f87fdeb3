use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use crate::engine::errors::{PipelineError, Stage};
use crate::engine::pipeline::{Pipeline, PipelineSpec, RunReport};
use crate::engine::sink::open_sink;
use crate::engine::source::open_source;
use crate::engine::types::WideTable;
use crate::shared::cancel::{CancellationToken, sleep_unless_cancelled};
use crate::shared::config::Settings;

const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Runs one slicing pass and writes the result, retrying the write up to
/// `sink.retries` times with the table kept from the failed attempt.
pub async fn handle(settings: &Settings, cancel: &CancellationToken) -> anyhow::Result<RunReport> {
    let spec = PipelineSpec::from_settings(settings).inspect_err(PipelineError::log_error)?;
    let parser = settings.time.parser().map_err(anyhow::Error::msg)?;

    let source = open_source(&settings.source, parser)
        .await
        .with_context(|| format!("opening source {}", settings.source.path.display()))?;
    let sink = open_sink(&settings.sink)
        .await
        .with_context(|| format!("opening sink {}", settings.sink.path.display()))?;

    let pipeline = Pipeline::new(spec, source, sink).with_cancellation(cancel.clone());

    let started = Instant::now();
    let (table, mut report) = pipeline.compute().await.inspect_err(PipelineError::log_error)?;
    write_with_retry(&pipeline, table, settings.sink.retries, RETRY_BACKOFF, cancel)
        .await
        .inspect_err(PipelineError::log_error)?;

    report.elapsed = started.elapsed();
    report.log();
    Ok(report)
}

/// Writes `table`, retrying failed writes `retries` more times. Nothing is
/// written if the token is already cancelled. A token cancelled between
/// attempts stops retrying.
pub async fn write_with_retry(
    pipeline: &Pipeline,
    table: WideTable,
    retries: u32,
    backoff: Duration,
    cancel: &CancellationToken,
) -> Result<WideTable, PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled { stage: Stage::Write });
    }
    let mut pending = table;
    let mut attempt = 0;
    loop {
        match pipeline.write(pending).await {
            Ok(written) => {
                if attempt > 0 {
                    info!(target: "sensor_slicer::pipeline", attempt, "Write succeeded after retry");
                }
                return Ok(written);
            }
            Err(err) => {
                if attempt >= retries || cancel.is_cancelled() {
                    return Err(err);
                }
                attempt += 1;
                warn!(
                    target: "sensor_slicer::pipeline",
                    attempt,
                    retries,
                    "Sink write failed, retrying: {}",
                    err
                );
                pending = err.into_retained()?;
                if !sleep_unless_cancelled(cancel, backoff * attempt).await {
                    return Err(PipelineError::Cancelled { stage: Stage::Write });
                }
            }
        }
    }
}
