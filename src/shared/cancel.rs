//! Cooperative cancellation shared between the ctrl-c handler and the
//! long-running loops.

use std::time::Duration;

pub use tokio_util::sync::CancellationToken;

/// Sleeps for `period` unless `token` is cancelled first. Returns false when
/// the sleep was cut short.
pub async fn sleep_unless_cancelled(token: &CancellationToken, period: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(period) => !token.is_cancelled(),
        _ = token.cancelled() => false,
    }
}

/// Cancels `token` on the first SIGINT/ctrl-c.
pub fn cancel_on_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(target: "sensor_slicer::shutdown", "Interrupt received, stopping after current unit of work");
            token.cancel();
        }
    });
}
