// ── Runtime session configuration ──
//
// Describes *how* to reach the campaign gateway. Carries the bearer
// credential and timer tuning, but never touches disk — the CLI (or any
// other consumer) constructs a `SessionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Configuration for a single gateway session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gateway base URL (e.g. `https://gateway.example.com`).
    pub base_url: Url,

    /// Bearer token for the gateway. `None` means unauthenticated —
    /// every call will fail with an auth error, which the session
    /// surfaces like any other operation failure.
    pub token: Option<SecretString>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Accept self-signed TLS certificates.
    pub danger_accept_invalid_certs: bool,

    /// Account-status poll period. The poll runs for the whole session
    /// lifetime and keeps going through failures.
    pub status_poll_interval: Duration,

    /// QR re-issue period while a code is displayed and unclaimed.
    /// Pairing codes expire server-side; this keeps a scannable one up.
    pub qr_reissue_interval: Duration,

    /// How long an error/success banner stays before auto-clearing.
    pub alert_ttl: Duration,
}

impl SessionConfig {
    /// Config for the given gateway with default tuning.
    pub fn new(base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            base_url,
            token,
            timeout: Duration::from_secs(30),
            danger_accept_invalid_certs: false,
            status_poll_interval: Duration::from_secs(5),
            qr_reissue_interval: Duration::from_secs(30),
            alert_ttl: Duration::from_secs(5),
        }
    }
}
