//! Command handlers: CLI args -> core session -> output formatting.

pub mod config_cmd;
pub mod lights;
pub mod pair;
pub mod set;

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancel `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the current request");
            token.cancel();
        }
    });
}
