use anyhow::Context;
use tracing::{debug, info};

use crate::command::args::{Cli, Commands};
use crate::command::handlers::{replay, row_sum, slice, tables};
use crate::shared::cancel::CancellationToken;
use crate::shared::config::Settings;

/// Runs the selected subcommand against already-loaded settings.
pub async fn dispatch(
    cli: &Cli,
    mut settings: Settings,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    debug!(target: "sensor_slicer::dispatch", command = ?cli.command, "Dispatching command");

    match &cli.command {
        Commands::Slice(args) => {
            if !args.sensors.is_empty() {
                settings.pipeline.sensor_ids = args.sensors.clone();
            }
            let report = slice::handle(&settings, cancel).await?;
            if report.has_warnings() {
                info!(
                    target: "sensor_slicer::dispatch",
                    empty = report.empty_series.len(),
                    unresolved = report.unresolved_cells,
                    "Slice finished with warnings"
                );
            }
            Ok(())
        }
        Commands::Replay(_) => {
            let inserted = replay::handle(&settings.replay, cancel).await?;
            info!(target: "sensor_slicer::dispatch", inserted, "Replay finished");
            Ok(())
        }
        Commands::RowSum(_) => {
            let appended = row_sum::handle(&settings.row_sum, cancel).await?;
            info!(target: "sensor_slicer::dispatch", appended, "Row sum finished");
            Ok(())
        }
        Commands::Tables(args) => {
            let root = args.root.as_ref().unwrap_or(&settings.replay.root);
            tables::handle(root).context("listing tables")
        }
    }
}
