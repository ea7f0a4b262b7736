use thiserror::Error;

/// Top-level error type for the `zapcast-api` crate.
///
/// Covers every failure mode of the gateway client: missing or rejected
/// credentials, transport faults, structured API errors, and payload
/// decoding. `zapcast-core` maps these into user-facing alerts.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No bearer token is available in the ambient credential store.
    #[error("No API token configured")]
    MissingToken,

    /// The gateway rejected the token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The request could not be constructed (e.g. malformed media type).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ── Gateway API ─────────────────────────────────────────────────
    /// Non-2xx response. `message` is the body's `error` field when the
    /// gateway provided one, else a generic status-based string.
    #[error("Gateway API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error signals an invalid or missing
    /// credential — the session should be treated as unauthenticated.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
