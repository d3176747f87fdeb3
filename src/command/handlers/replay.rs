use anyhow::Context;

use crate::engine::replay::Replayer;
use crate::shared::cancel::CancellationToken;
use crate::shared::config::ReplayConfig;

pub async fn handle(cfg: &ReplayConfig, cancel: &CancellationToken) -> anyhow::Result<u64> {
    let replayer = Replayer::from_config(cfg)
        .with_context(|| format!("opening columnar store {}", cfg.root.display()))?;
    let inserted = replayer
        .run(cancel)
        .await
        .with_context(|| format!("replaying {} into {}", cfg.source_table, cfg.target_table))?;
    Ok(inserted)
}
