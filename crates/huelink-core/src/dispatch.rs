// ── Sequential command dispatch ──
//
// Lights are commanded one at a time in discovery order, with a fixed
// pause between requests; the bridge's embedded HTTP server handles very
// few concurrent connections. A failure on one light never stops the
// batch. Cancellation is honoured between lights; the light in flight
// finishes its current attempt but is not retried.

use std::time::Duration;

use huelink_api::ClipClient;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::CommandPayload;
use crate::discovery::Device;

/// What happened to one light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Success,
    /// The bridge answered but refused the update.
    Rejected { reason: String },
    /// The bridge could not be reached for this light, even after retries.
    TransportFailure { reason: String },
    /// Dispatch was cancelled before this light's turn.
    NotAttempted,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub device_id: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Sends one shared payload to every light.
pub struct DispatchEngine<'a> {
    clip: &'a ClipClient,
    pacing: Duration,
    cancel: CancellationToken,
}

impl<'a> DispatchEngine<'a> {
    /// `clip` must already carry the application key.
    pub fn new(clip: &'a ClipClient, pacing: Duration) -> Self {
        Self {
            clip,
            pacing,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop after the light currently in flight once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Command every device; one result per device, in input order.
    pub async fn dispatch(
        &self,
        devices: &[Device],
        payload: &CommandPayload,
    ) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(devices.len());

        for (index, device) in devices.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(remaining = devices.len() - index, "dispatch cancelled");
                results.extend(devices[index..].iter().map(|d| DispatchResult {
                    device_id: d.id.clone(),
                    outcome: DispatchOutcome::NotAttempted,
                }));
                break;
            }
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let outcome = self.command_one(device, payload).await;
            results.push(DispatchResult {
                device_id: device.id.clone(),
                outcome,
            });
        }

        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        info!(succeeded, total = results.len(), "dispatch finished");
        results
    }

    async fn command_one(&self, device: &Device, payload: &CommandPayload) -> DispatchOutcome {
        match self.clip.update_light(&device.id, payload.update()).await {
            Ok(ack) => {
                debug!(device = %device.id, updated = ack.updated.len(), "light updated");
                DispatchOutcome::Success
            }
            Err(e) if e.is_rejection() || e.is_unauthorized() => {
                warn!(device = %device.id, error = %e, "light rejected the command");
                DispatchOutcome::Rejected {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                warn!(device = %device.id, error = %e, "could not reach light");
                DispatchOutcome::TransportFailure {
                    reason: e.to_string(),
                }
            }
        }
    }
}
