//! Configuration for the huelink CLI.
//!
//! A flat TOML file layered under `HUELINK_*` environment variables, and
//! its translation to `huelink_core::BridgeConfig`. The CLI applies its
//! flag overrides on top of the loaded [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use huelink_core::{BridgeConfig, ColorCommand, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bridge configured (set `bridge` in {}, HUELINK_BRIDGE, or --bridge)", config_path().display())]
    NoBridge,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Bridge address: a bare host (`192.168.1.20`) or a full URL.
    pub bridge: Option<String>,

    /// `devicetype` announced while pairing.
    #[serde(default = "default_devicetype")]
    pub devicetype: String,

    /// Accept the bridge's self-signed certificate. Unset behaves like
    /// `true`; `false` switches to the system trust store.
    pub insecure: Option<bool>,

    /// Pin the bridge certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Pause between consecutive light commands.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// `0` waits for the link button forever.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// Defaults to `client_details.json` in the data directory.
    pub credentials_file: Option<PathBuf>,

    /// Defaults to `my_lights.json` in the data directory.
    pub snapshot_file: Option<PathBuf>,

    #[serde(default)]
    pub default_color: ColorDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: None,
            devicetype: default_devicetype(),
            insecure: None,
            ca_cert: None,
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            pacing_ms: default_pacing_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            credentials_file: None,
            snapshot_file: None,
            default_color: ColorDefaults::default(),
        }
    }
}

/// Color used when `set` gets no (or unusable) values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ColorDefaults {
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

impl Default for ColorDefaults {
    fn default() -> Self {
        let white = ColorCommand::reference_white();
        Self {
            x: white.x(),
            y: white.y(),
            intensity: white.intensity(),
        }
    }
}

fn default_devicetype() -> String {
    "huelink#cli".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    256
}
fn default_retry_delay_ms() -> u64 {
    20
}
fn default_pacing_ms() -> u64 {
    50
}
fn default_confirmation_timeout_secs() -> u64 {
    300
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "huelink", "huelink")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for credentials and discovery snapshots.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("huelink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file. A missing file just yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUELINK_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to pretty TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Normalize a bridge address into a base URL ending in `/`.
///
/// Bare hosts get `https://`; bridges only serve the light API over TLS.
pub fn bridge_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };

    let mut url: Url = with_scheme.parse().map_err(|e| ConfigError::Validation {
        field: "bridge".into(),
        reason: format!("invalid address '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "bridge".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl Config {
    fn tls(&self) -> TlsVerification {
        match (self.insecure, &self.ca_cert) {
            (Some(true), _) | (None, None) => TlsVerification::DangerAcceptInvalid,
            (_, Some(ca)) => TlsVerification::CustomCa(ca.clone()),
            (Some(false), None) => TlsVerification::SystemDefaults,
        }
    }

    /// The configured fallback color, validated.
    pub fn default_color(&self) -> Result<ColorCommand, ConfigError> {
        let c = self.default_color;
        ColorCommand::new(c.x, c.y, c.intensity).map_err(|e| ConfigError::Validation {
            field: "default_color".into(),
            reason: e.to_string(),
        })
    }

    /// Build the runtime `BridgeConfig`.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        let raw = self.bridge.as_deref().ok_or(ConfigError::NoBridge)?;
        let mut bridge = BridgeConfig::new(bridge_url(raw)?);

        bridge.devicetype.clone_from(&self.devicetype);
        bridge.tls = self.tls();
        bridge.timeout = Duration::from_secs(self.timeout);
        bridge.max_retries = self.max_retries;
        bridge.retry_delay = Duration::from_millis(self.retry_delay_ms);
        bridge.pacing = Duration::from_millis(self.pacing_ms);
        bridge.confirmation_timeout = match self.confirmation_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        bridge.credentials_path = self
            .credentials_file
            .clone()
            .unwrap_or_else(|| data_dir().join("client_details.json"));
        bridge.snapshot_path = self
            .snapshot_file
            .clone()
            .unwrap_or_else(|| data_dir().join("my_lights.json"));
        bridge.default_color = self.default_color()?;
        Ok(bridge)
    }
}
