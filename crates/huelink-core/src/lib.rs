//! Onboarding and command dispatch for a Hue bridge.
//!
//! The workflow runs leaf-first through five components:
//!
//! - **[`CredentialStore`]**: loads and atomically saves the application
//!   key pair issued at pairing time.
//! - **[`PairingStateMachine`]**: drives the link-button handshake, pausing
//!   on an injected [`LinkConfirmation`] port between attempts.
//! - **[`DeviceDiscovery`]**: lists the bridge's lights and writes a raw
//!   diagnostic snapshot.
//! - **[`command`]**: turns a validated [`ColorCommand`] into the shared
//!   [`CommandPayload`].
//! - **[`DispatchEngine`]**: commands every light in discovery order,
//!   isolating per-light failures.
//!
//! [`Session`] wires them together from a single [`BridgeConfig`].

pub mod command;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod pairing;
pub mod session;
mod storage;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{ColorCommand, ColorSource, CommandPayload};
pub use config::{BridgeConfig, TlsVerification};
pub use credentials::{CredentialLookup, CredentialStore, Credentials};
pub use discovery::{Device, DeviceDiscovery};
pub use dispatch::{DispatchEngine, DispatchOutcome, DispatchResult};
pub use error::CoreError;
pub use pairing::{Confirmation, LinkConfirmation, PairingState, PairingStateMachine};
pub use session::{RunReport, Session};
