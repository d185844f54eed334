// ── Core error types ──
//
// Workflow-level failure classes. Consumers never match on HTTP status
// codes or JSON parse failures directly; the `From<huelink_api::Error>`
// impl folds transport-layer errors into these variants.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {value} is outside {expected}")]
    InputInvalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    // ── Credentials ──────────────────────────────────────────────────
    #[error("No credentials at {}; run `huelink pair` first", path.display())]
    NotPaired { path: PathBuf },

    #[error("Stored credentials at {} are unusable: {reason}", path.display())]
    CredentialsCorrupt { path: PathBuf, reason: String },

    #[error("Bridge rejected the application key: {message}")]
    AuthFailure { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot reach bridge at {url}: {reason}")]
    BridgeUnreachable { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    TransportFailure { url: String, reason: String },

    #[error("Pairing cancelled: {reason}")]
    Cancelled { reason: String },

    // ── Bridge responses ─────────────────────────────────────────────
    #[error("Unexpected bridge response: {message}")]
    Api { message: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Cannot write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huelink_api::Error> for CoreError {
    fn from(err: huelink_api::Error) -> Self {
        use huelink_api::Error as ApiError;

        match err {
            ApiError::Unauthorized { .. } | ApiError::InvalidApplicationKey => {
                CoreError::AuthFailure {
                    message: err.to_string(),
                }
            }
            ApiError::Transport(ref e) => CoreError::TransportFailure {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                reason: err.to_string(),
            },
            ApiError::RetriesExhausted { ref source, .. } => CoreError::TransportFailure {
                url: source.url().map(ToString::to_string).unwrap_or_default(),
                reason: err.to_string(),
            },
            ApiError::Tls(reason) => CoreError::TransportFailure {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Bridge { .. }
            | ApiError::UnexpectedResponse(_)
            | ApiError::Clip { .. }
            | ApiError::Rejected { .. }
            | ApiError::Deserialization { .. } => CoreError::Api {
                message: err.to_string(),
            },
        }
    }
}
