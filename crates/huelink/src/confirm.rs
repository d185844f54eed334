//! Terminal prompt behind the pairing machine's confirmation port.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use huelink_core::{Confirmation, LinkConfirmation};

/// Asks on the controlling terminal. Ctrl-C (via `cancel`) counts as a
/// decline; so does a missing terminal.
pub struct TerminalConfirmation {
    cancel: CancellationToken,
}

impl TerminalConfirmation {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

impl LinkConfirmation for TerminalConfirmation {
    fn confirm(&mut self, attempt: u32) -> impl Future<Output = Confirmation> + Send {
        let cancel = self.cancel.clone();
        let prompt = if attempt == 1 {
            "Press the link button on the bridge, then continue".to_owned()
        } else {
            format!("Link button still not pressed (attempt {attempt}). Press it and continue")
        };

        async move {
            let ask = tokio::task::spawn_blocking(move || {
                dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(true)
                    .interact()
            });

            tokio::select! {
                () = cancel.cancelled() => Confirmation::Declined,
                answer = ask => match answer {
                    Ok(Ok(true)) => Confirmation::Pressed,
                    Ok(Ok(false)) => Confirmation::Declined,
                    Ok(Err(e)) => {
                        warn!(error = %e, "cannot prompt for the link button");
                        Confirmation::Declined
                    }
                    Err(e) => {
                        warn!(error = %e, "confirmation prompt aborted");
                        Confirmation::Declined
                    }
                },
            }
        }
    }
}
