// Wire-level schemas for the campaign gateway API.
//
// Every field the gateway may omit is `#[serde(default)]`-filled here,
// so consumers read fully-populated structs instead of option-chaining
// through loosely-typed JSON.

use serde::{Deserialize, Serialize};

/// One messaging account as reported by `GET /api/whatsapp/status`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Unique key within the account list.
    pub phone_number: String,

    /// Whether the account currently holds a valid session.
    #[serde(default)]
    pub is_authenticated: bool,

    /// Whether this account is the one selected for dispatch.
    #[serde(default)]
    pub is_active: bool,

    /// Number of campaigns sent through this account (informational).
    #[serde(default)]
    pub campaign_count: u64,

    /// Free-text status annotation. May carry a reconnection notice that
    /// arrives before `is_authenticated` flips (see `zapcast-core`).
    #[serde(default)]
    pub message: Option<String>,
}

/// Response shape of `GET /api/whatsapp/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
}

/// Response shape of `GET /api/whatsapp/qr`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    /// Opaque image payload (data URI or URL) for the pairing code.
    pub qr_code: String,

    /// Snapshot of already-paired accounts, returned alongside the code.
    #[serde(default)]
    pub existing_accounts: Vec<AccountRecord>,
}

/// Request body of `POST /api/whatsapp/switch-account`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRequest {
    pub phone_number: String,
}

/// Response shape of `POST /api/whatsapp/switch-account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResponse {
    #[serde(default)]
    pub message: String,

    /// Set when the target account's session has lapsed and a fresh
    /// pairing is required before it can dispatch.
    #[serde(default)]
    pub needs_reauth: bool,
}

/// Aggregate outcome of `POST /api/whatsapp/send`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    #[serde(default)]
    pub total_sent: u64,

    #[serde(default)]
    pub total_failed: u64,
}

/// A campaign submission, sent as a multipart form.
#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub campaign_name: String,
    pub message: String,
    /// Newline-delimited recipient identifiers.
    pub users: String,
    /// Optional binary attachment.
    pub media: Option<MediaUpload>,
}

/// A media attachment for a campaign.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    /// MIME type, when known. The multipart part falls back to
    /// `application/octet-stream` otherwise.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
