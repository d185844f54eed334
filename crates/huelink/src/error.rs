//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use huelink_config::ConfigError;
use huelink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const PARTIAL_FAILURE: i32 = 9;
    pub const CANCELLED: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the bridge at {url}")]
    #[diagnostic(
        code(huelink::connection_failed),
        help(
            "Check that the bridge is powered and on this network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The bridge rejected the stored application key")]
    #[diagnostic(
        code(huelink::auth_failed),
        help(
            "The key may have been deleted in the Hue app.\n\
             Run: huelink pair --force\n\
             Details: {message}"
        )
    )]
    AuthFailed { message: String },

    #[error("Not paired with a bridge yet")]
    #[diagnostic(
        code(huelink::not_paired),
        help("Run: huelink pair\nCredentials will be stored at: {path}")
    )]
    NotPaired { path: String },

    #[error("Stored credentials at {path} are unusable: {reason}")]
    #[diagnostic(code(huelink::credentials_corrupt), help("Run: huelink pair --force"))]
    CredentialsCorrupt { path: String, reason: String },

    // ── Outcome ──────────────────────────────────────────────────────
    #[error("{failed} of {total} lights were not updated")]
    #[diagnostic(
        code(huelink::partial_failure),
        help("Re-run with -v for per-light details, or check the bridge in the Hue app.")
    )]
    PartialFailure { failed: usize, total: usize },

    #[error("Cancelled: {reason}")]
    #[diagnostic(code(huelink::cancelled))]
    Cancelled { reason: String },

    // ── Bridge ───────────────────────────────────────────────────────
    #[error("Unexpected bridge response: {message}")]
    #[diagnostic(code(huelink::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huelink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No bridge configured")]
    #[diagnostic(
        code(huelink::no_bridge),
        help(
            "Pass --bridge <address>, set HUELINK_BRIDGE, or run: huelink config init\n\
             Config file: {path}"
        )
    )]
    NoBridge { path: String },

    #[error(transparent)]
    #[diagnostic(code(huelink::config))]
    Config(Box<figment::Error>),

    // ── Local state / IO ─────────────────────────────────────────────
    #[error("Cannot write {path}")]
    #[diagnostic(code(huelink::storage), help("Check permissions on the data directory."))]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render output: {0}")]
    #[diagnostic(code(huelink::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotPaired { .. } | Self::CredentialsCorrupt { .. } => {
                exit_code::AUTH
            }
            Self::PartialFailure { .. } => exit_code::PARTIAL_FAILURE,
            Self::Cancelled { .. } => exit_code::CANCELLED,
            Self::Validation { .. } | Self::NoBridge { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InputInvalid {
                field,
                value,
                expected,
            } => CliError::Validation {
                field: field.into(),
                reason: format!("{value} is outside {expected}"),
            },

            CoreError::NotPaired { path } => CliError::NotPaired {
                path: path.display().to_string(),
            },

            CoreError::CredentialsCorrupt { path, reason } => CliError::CredentialsCorrupt {
                path: path.display().to_string(),
                reason,
            },

            CoreError::AuthFailure { message } => CliError::AuthFailed { message },

            CoreError::BridgeUnreachable { url, reason }
            | CoreError::TransportFailure { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Cancelled { reason } => CliError::Cancelled { reason },

            CoreError::Api { message } => CliError::ApiError { message },

            CoreError::Storage { path, source } => CliError::Storage {
                path: path.display().to_string(),
                source,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoBridge => CliError::NoBridge {
                path: huelink_config::config_path().display().to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
