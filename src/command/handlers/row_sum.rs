use anyhow::Context;

use crate::engine::replay::RowSummer;
use crate::shared::cancel::CancellationToken;
use crate::shared::config::RowSumConfig;

pub async fn handle(cfg: &RowSumConfig, cancel: &CancellationToken) -> anyhow::Result<u64> {
    let summer = RowSummer::from_config(cfg)
        .with_context(|| format!("opening columnar store {}", cfg.root.display()))?;
    let appended = summer
        .run(cancel)
        .await
        .with_context(|| format!("summing {} into {}", cfg.source_table, cfg.target_table))?;
    Ok(appended)
}
