//! Async client for the zapcast campaign gateway's REST API.
//!
//! [`GatewayClient`] wraps `reqwest` with bearer-token authentication,
//! JSON and multipart submission, and normalization of error responses
//! into the [`Error`] taxonomy. Response schemas are explicit: optional
//! server fields are default-filled at this boundary so consumers never
//! deal with missing-field surprises.
//!
//! This layer performs no retries and owns no timers — freshness and
//! recovery are `zapcast-core`'s concern.

pub mod accounts;
pub mod campaigns;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{
    AccountRecord, CampaignRequest, MediaUpload, QrResponse, SendOutcome, StatusResponse,
    SwitchResponse,
};
pub use transport::TransportConfig;
