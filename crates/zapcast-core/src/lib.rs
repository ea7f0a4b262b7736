//! Reactive session layer between `zapcast-api` and UI consumers.
//!
//! This crate owns the connection state store and the two flows that
//! share it — account pairing and campaign dispatch:
//!
//! - **[`Session`]** — Central facade managing the lifecycle:
//!   [`start()`](Session::start) spawns the status poll and QR re-issue
//!   tasks; intents (`fetch_qr_code`, `switch_account`, `send_campaign`,
//!   ...) run against the gateway and feed results into the state
//!   machine; [`shutdown()`](Session::shutdown) cancels and joins every
//!   background task.
//!
//! - **[`SessionState`]** — The state store: account list, current
//!   selection, QR payload/visibility, in-flight phase, alert banner,
//!   and the campaign draft. Mutated exclusively through the reducer
//!   [`SessionState::apply`], so every transition is testable without
//!   any I/O. Consumers observe it via `watch`-channel snapshots.
//!
//! - **Domain model** ([`model`]) — [`Account`] (with the
//!   reconnection-tolerant connectivity check), [`CampaignDraft`] and
//!   its validation gate, [`DispatchReport`].
//!
//! Failure policy: every gateway error is caught at this boundary,
//! logged, and converted into a fixed per-operation alert string. No
//! operation is fatal; all are retryable by user action or the next
//! poll tick.

pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use error::CoreError;
pub use model::{Account, CampaignDraft, CampaignPatch, DispatchReport, MediaAttachment};
pub use session::Session;
pub use state::{Alert, AlertKind, Effect, Event, Phase, SessionState};
