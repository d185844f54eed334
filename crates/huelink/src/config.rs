//! CLI configuration: the shared `huelink_config` file plus flag overrides.

use std::path::PathBuf;

use huelink_config::{Config, ConfigError};
use huelink_core::BridgeConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` if given, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(huelink_config::config_path)
}

/// Load the config file and environment, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = huelink_config::load_config_from(&config_path(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Flags win over file and environment values.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref bridge) = global.bridge {
        cfg.bridge = Some(bridge.clone());
    }
    if let Some(ref path) = global.credentials {
        cfg.credentials_file = Some(path.clone());
    }
    if global.insecure {
        cfg.insecure = Some(true);
    }
    if let Some(ref ca) = global.ca_cert {
        cfg.ca_cert = Some(ca.clone());
        cfg.insecure = Some(false);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
}

/// Build the runtime `BridgeConfig` for commands that talk to the bridge.
pub fn bridge_config(global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let cfg = load(global)?;
    cfg.to_bridge_config().map_err(|e| match e {
        ConfigError::NoBridge => CliError::NoBridge {
            path: config_path(global).display().to_string(),
        },
        other => other.into(),
    })
}
