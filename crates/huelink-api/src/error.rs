use thiserror::Error;

/// Top-level error type for the `huelink-api` crate.
///
/// Covers every failure mode of the two API surfaces the bridge exposes:
/// the v1 pairing endpoint and the CLIP v2 light resource.
/// `huelink-core` maps these into the workflow's failure classes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bridge refused the `hue-application-key` header.
    #[error("Application key rejected by bridge (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The application key cannot be sent as a header value.
    #[error("Application key is not a valid header value")]
    InvalidApplicationKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Connection failures persisted past the retry budget.
    #[error("Bridge did not answer after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Pairing (v1) ────────────────────────────────────────────────
    /// Structured `{"error": {...}}` record from the v1 API.
    #[error("Bridge error {kind}: {description}")]
    Bridge {
        kind: u16,
        address: String,
        description: String,
    },

    /// The pairing endpoint answered with a shape we do not understand.
    #[error("Unexpected pairing response: {0}")]
    UnexpectedResponse(String),

    // ── CLIP v2 ─────────────────────────────────────────────────────
    /// Non-success status from a CLIP read.
    #[error("CLIP API error (HTTP {status}): {message}")]
    Clip { status: u16, message: String },

    /// A light update was refused by the bridge.
    #[error("Update rejected (HTTP {status}): {}", reasons.join("; "))]
    Rejected { status: u16, reasons: Vec<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the bridge rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::InvalidApplicationKey)
    }

    /// Returns `true` if the bridge could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::RetriesExhausted { .. } | Self::Tls(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the bridge answered but refused the request body.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::Unauthorized { .. } | Self::Clip { .. }
        )
    }
}

/// Whether a `reqwest` failure is worth another attempt.
///
/// Only failures to connect qualify: a request that timed out may already
/// have been applied by the bridge.
pub(crate) fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect()
}

/// First 200 bytes of a body, for log and error previews.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
