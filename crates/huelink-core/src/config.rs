// ── Runtime bridge configuration ──
//
// Describes *how* to talk to one bridge and where to keep local state.
// Never touches disk itself; the CLI builds a `BridgeConfig` (usually via
// `huelink-config`) and hands it to `Session`.

use std::path::PathBuf;
use std::time::Duration;

use huelink_api::{RetryPolicy, TlsMode, TransportConfig};
use url::Url;

use crate::command::ColorCommand;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Trust only the given PEM, typically the bridge's own certificate
    /// exported after the first pairing.
    CustomCa(PathBuf),
    /// Skip verification. Bridges present a self-signed certificate, so
    /// this is the trust-on-first-use default.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for onboarding to and commanding a single bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bridge base URL (e.g., `https://192.168.1.20/`).
    pub url: Url,
    /// `devicetype` announced while pairing (`app#instance`).
    pub devicetype: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts for transient transport failures.
    pub max_retries: u32,
    /// Pause between transport retries.
    pub retry_delay: Duration,
    /// Pause between consecutive light commands.
    pub pacing: Duration,
    /// Upper bound on a single link-button confirmation wait. `None` waits forever.
    pub confirmation_timeout: Option<Duration>,
    /// Where pairing credentials are persisted.
    pub credentials_path: PathBuf,
    /// Where the raw discovery response is written.
    pub snapshot_path: PathBuf,
    /// Color used when the requested one is missing or invalid.
    pub default_color: ColorCommand,
}

impl BridgeConfig {
    /// Configuration for the bridge at `url` with default tuning.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            devicetype: "huelink#cli".into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            max_retries: 256,
            retry_delay: Duration::from_millis(20),
            pacing: Duration::from_millis(50),
            confirmation_timeout: Some(Duration::from_secs(300)),
            credentials_path: PathBuf::from("client_details.json"),
            snapshot_path: PathBuf::from("my_lights.json"),
            default_color: ColorCommand::reference_white(),
        }
    }

    /// Transport settings shared by every client built for this bridge.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                delay: self.retry_delay,
            },
        }
    }
}
