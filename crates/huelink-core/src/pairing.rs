// ── Link-button pairing ──
//
// AwaitingPhysicalConfirmation ──(granted)──▶ Paired
//        │  ▲
//        │  └─(operator confirms)─ link button not pressed
//        ├──(transport / unexpected reply)──▶ Unreachable
//        └──(declined / confirmation timeout)──▶ Cancelled
//
// The machine never retries on its own schedule: after every "link button
// not pressed" reply it waits for the injected `LinkConfirmation` port.

use std::future::Future;
use std::time::Duration;

use huelink_api::{LinkClient, LinkResponse};
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::error::CoreError;

/// Operator's answer to "press the link button, then continue".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The button was pressed; try again.
    Pressed,
    /// The operator gave up.
    Declined,
}

/// Port through which the machine asks a human to press the link button.
pub trait LinkConfirmation {
    /// Called once per "link button not pressed" reply. `attempt` starts at 1.
    fn confirm(&mut self, attempt: u32) -> impl Future<Output = Confirmation> + Send;
}

/// Where the handshake currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
    AwaitingPhysicalConfirmation,
    Paired(Credentials),
    Unreachable { reason: String },
    Cancelled { reason: String },
}

impl PairingState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::AwaitingPhysicalConfirmation)
    }
}

/// Drives one bridge through the link-button handshake.
pub struct PairingStateMachine {
    client: LinkClient,
    devicetype: String,
    confirmation_timeout: Option<Duration>,
    state: PairingState,
    confirmations: u32,
}

impl PairingStateMachine {
    pub fn new(client: LinkClient, devicetype: impl Into<String>) -> Self {
        Self {
            client,
            devicetype: devicetype.into(),
            confirmation_timeout: None,
            state: PairingState::AwaitingPhysicalConfirmation,
            confirmations: 0,
        }
    }

    /// Bound each confirmation wait; expiry ends in [`PairingState::Cancelled`].
    pub fn with_confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn state(&self) -> &PairingState {
        &self.state
    }

    /// How many times the operator was asked to press the button.
    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    /// Run the handshake to a terminal state.
    ///
    /// Transport failures and unexpected replies are fatal and never retried.
    pub async fn run<C: LinkConfirmation>(
        &mut self,
        confirm: &mut C,
    ) -> Result<Credentials, CoreError> {
        while !self.state.is_terminal() {
            self.step(confirm).await;
        }

        match &self.state {
            PairingState::Paired(creds) => Ok(creds.clone()),
            PairingState::Cancelled { reason } => Err(CoreError::Cancelled {
                reason: reason.clone(),
            }),
            PairingState::Unreachable { reason } => Err(CoreError::BridgeUnreachable {
                url: self.client.base_url().to_string(),
                reason: reason.clone(),
            }),
            PairingState::AwaitingPhysicalConfirmation => Err(CoreError::Api {
                message: "pairing stopped before reaching a terminal state".into(),
            }),
        }
    }

    /// Send one pairing request and advance the state accordingly.
    async fn step<C: LinkConfirmation>(&mut self, confirm: &mut C) {
        debug!(devicetype = %self.devicetype, "requesting client key");

        self.state = match self.client.request_client_key(&self.devicetype).await {
            Ok(LinkResponse::Granted(key)) => match Credentials::new(key.username, key.clientkey) {
                Ok(creds) => {
                    info!("bridge issued a new application key");
                    PairingState::Paired(creds)
                }
                Err(reason) => PairingState::Unreachable {
                    reason: format!("bridge issued unusable credentials: {reason}"),
                },
            },
            Ok(LinkResponse::LinkButtonNotPressed) => self.await_confirmation(confirm).await,
            Err(e) => {
                warn!(error = %e, "pairing request failed");
                PairingState::Unreachable {
                    reason: e.to_string(),
                }
            }
        };
    }

    async fn await_confirmation<C: LinkConfirmation>(&mut self, confirm: &mut C) -> PairingState {
        self.confirmations += 1;
        let attempt = self.confirmations;
        info!(attempt, "waiting for the link button");

        let answer = match self.confirmation_timeout {
            Some(limit) => match tokio::time::timeout(limit, confirm.confirm(attempt)).await {
                Ok(answer) => answer,
                Err(_) => {
                    return PairingState::Cancelled {
                        reason: format!("no confirmation within {}s", limit.as_secs()),
                    };
                }
            },
            None => confirm.confirm(attempt).await,
        };

        match answer {
            Confirmation::Pressed => PairingState::AwaitingPhysicalConfirmation,
            Confirmation::Declined => PairingState::Cancelled {
                reason: "operator declined".into(),
            },
        }
    }
}
