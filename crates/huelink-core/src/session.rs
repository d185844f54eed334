// ── Session: one onboarding-and-dispatch run ──
//
// Owns the bridge configuration and the credential store, and builds the
// short-lived HTTP clients each phase needs:
//
//   load credentials ──(missing / corrupt / forced)──▶ pair ──▶ save
//          │                                                    │
//          └────────────────────────┬───────────────────────────┘
//                                   ▼
//                     discover ──▶ build payload ──▶ dispatch
//
// An auth rejection from the bridge is reported, never answered with an
// automatic re-pair: pairing needs a human at the link button.

use huelink_api::{ClipClient, LinkClient, RetryPolicy};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::command::{self, ColorCommand};
use crate::config::BridgeConfig;
use crate::credentials::{CredentialLookup, CredentialStore, Credentials};
use crate::discovery::{Device, DeviceDiscovery};
use crate::dispatch::{DispatchEngine, DispatchResult};
use crate::error::CoreError;
use crate::pairing::{LinkConfirmation, PairingStateMachine};

/// Summary of an `apply` run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// `true` when this run had to pair before dispatching.
    pub paired: bool,
    pub devices: Vec<Device>,
    pub results: Vec<DispatchResult>,
}

impl RunReport {
    /// Results for lights that did not end in success.
    pub fn failures(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results.iter().filter(|r| !r.outcome.is_success())
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Entry point for everything that talks to one bridge.
pub struct Session {
    config: BridgeConfig,
    store: CredentialStore,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(config: BridgeConfig) -> Self {
        let store = CredentialStore::new(config.credentials_path.clone());
        Self {
            config,
            store,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Token that stops dispatch between lights when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Stored credentials, without ever pairing.
    pub fn stored_credentials(&self) -> Result<Credentials, CoreError> {
        match self.store.load() {
            CredentialLookup::Found(creds) => Ok(creds),
            CredentialLookup::NotFound => Err(CoreError::NotPaired {
                path: self.store.path().to_path_buf(),
            }),
            CredentialLookup::Corrupt { reason } => Err(CoreError::CredentialsCorrupt {
                path: self.store.path().to_path_buf(),
                reason,
            }),
        }
    }

    /// Stored credentials, pairing first when there are none usable or
    /// when `force` is set. The flag in the result is `true` if this call
    /// paired.
    pub async fn credentials<C: LinkConfirmation>(
        &self,
        confirm: &mut C,
        force: bool,
    ) -> Result<(Credentials, bool), CoreError> {
        if !force {
            match self.store.load() {
                CredentialLookup::Found(creds) => return Ok((creds, false)),
                CredentialLookup::NotFound => {
                    info!("no stored credentials, pairing with the bridge");
                }
                CredentialLookup::Corrupt { reason } => {
                    warn!(
                        path = %self.store.path().display(),
                        %reason,
                        "stored credentials unusable, pairing again"
                    );
                }
            }
        }
        let creds = self.pair(confirm).await?;
        Ok((creds, true))
    }

    /// Run the link-button handshake and persist the result.
    ///
    /// Pairing requests are sent once each, without transport retries.
    /// Failing to save the issued key is an error.
    pub async fn pair<C: LinkConfirmation>(
        &self,
        confirm: &mut C,
    ) -> Result<Credentials, CoreError> {
        let mut transport = self.config.transport();
        transport.retry = RetryPolicy::none();
        let link = LinkClient::new(self.config.url.clone(), &transport)?;
        let mut machine = PairingStateMachine::new(link, self.config.devicetype.clone())
            .with_confirmation_timeout(self.config.confirmation_timeout);

        let creds = machine.run(confirm).await?;
        self.store.save(&creds)?;
        info!(
            path = %self.store.path().display(),
            confirmations = machine.confirmations(),
            "paired with bridge"
        );
        Ok(creds)
    }

    // ── Lights ───────────────────────────────────────────────────────

    /// Authenticated client for the light endpoints. Stops retrying
    /// failed connections once the session is cancelled.
    pub fn clip_client(&self, credentials: &Credentials) -> Result<ClipClient, CoreError> {
        let clip = ClipClient::from_application_key(
            self.config.url.clone(),
            credentials.username(),
            &self.config.transport(),
        )?;
        Ok(clip.with_cancellation(self.cancel.clone()))
    }

    pub async fn discover(&self, clip: &ClipClient) -> Result<Vec<Device>, CoreError> {
        DeviceDiscovery::new(clip, self.config.snapshot_path.clone())
            .list()
            .await
    }

    /// Full run: credentials, discovery, then one command to every light.
    pub async fn apply<C: LinkConfirmation>(
        &self,
        color: &ColorCommand,
        confirm: &mut C,
    ) -> Result<RunReport, CoreError> {
        let (creds, paired) = self.credentials(confirm, false).await?;
        let clip = self.clip_client(&creds)?;
        let devices = match self.discover(&clip).await {
            Ok(devices) => devices,
            Err(_) if self.cancel.is_cancelled() => {
                return Err(CoreError::Cancelled {
                    reason: "interrupted during discovery".into(),
                });
            }
            Err(e) => return Err(e),
        };

        let payload = command::build(color);
        let results = DispatchEngine::new(&clip, self.config.pacing)
            .with_cancellation(self.cancel.clone())
            .dispatch(&devices, &payload)
            .await;

        Ok(RunReport {
            paired,
            devices,
            results,
        })
    }
}
