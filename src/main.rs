use clap::Parser;
use sensor_slicer::command::{Cli, dispatch};
use sensor_slicer::logging;
use sensor_slicer::shared::cancel::{CancellationToken, cancel_on_ctrl_c};
use sensor_slicer::shared::config::load_settings;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), &cli.overrides())?;
    logging::init(&settings.logging)?;

    info!("sensor_slicer is starting...");
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    if let Err(err) = dispatch(&cli, settings, &cancel).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
