// ── Session facade ──
//
// Lifecycle management for one gateway connection: background status
// polling, QR re-issue, alert expiry, and the user-driven intents.
// All state mutation funnels through `dispatch()` -> reducer `apply()`;
// this module owns the I/O and the timers around it.

use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use zapcast_api::{GatewayClient, TransportConfig};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::model::{CampaignPatch, DispatchReport, accounts_from_records};
use crate::state::{Effect, Event, FIELDS_REQUIRED, SessionState};

// ── Session ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. The session is the single writer of
/// [`SessionState`]; presentation layers observe it through
/// [`subscribe()`](Self::subscribe) / [`snapshot()`](Self::snapshot)
/// and express intent through the async methods below.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: GatewayClient,
    config: SessionConfig,
    /// The authoritative state. Guarded by a sync mutex — every
    /// critical section is a pure reducer step, never an await.
    state: StdMutex<SessionState>,
    /// Read-side snapshot, rebuilt after every transition.
    snapshot: watch::Sender<Arc<SessionState>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Create a session from configuration. Does NOT start background
    /// tasks — call [`start()`](Self::start) for that; one-shot
    /// consumers can drive the intents directly.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            danger_accept_invalid_certs: config.danger_accept_invalid_certs,
        };
        let client = GatewayClient::new(config.base_url.clone(), config.token.clone(), &transport)?;

        let (snapshot, _) = watch::channel(Arc::new(SessionState::default()));
        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                config,
                state: StdMutex::new(SessionState::default()),
                snapshot,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.inner.snapshot.subscribe()
    }

    /// The current state snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<SessionState> {
        self.inner.snapshot.borrow().clone()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Perform the initial status load and spawn the background tasks:
    /// the periodic status poll and the QR re-issue loop.
    pub async fn start(&self) {
        if let Err(e) = self.refresh_status().await {
            warn!(error = %e, "initial status load failed");
        }

        let mut handles = self.inner.task_handles.lock().await;

        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(status_poll_task(
            self.clone(),
            self.inner.config.status_poll_interval,
            cancel,
        )));

        let session = self.clone();
        let rx = self.subscribe();
        let period = self.inner.config.qr_reissue_interval;
        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(async move {
            reissue_loop(rx, period, cancel, || {
                let session = session.clone();
                async move {
                    if let Err(e) = session.fetch_qr_code().await {
                        warn!(error = %e, "QR re-issue failed");
                    }
                }
            })
            .await;
        }));
    }

    /// Cancel and join every background task.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("session shut down");
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Fetch `GET /status` and replace the account list wholesale.
    ///
    /// On failure the stale list stays, the fixed error banner is
    /// raised, and the error is also returned for one-shot callers.
    /// The background poll ignores the return value.
    pub async fn refresh_status(&self) -> Result<(), CoreError> {
        self.dispatch(Event::StatusStarted);
        match self.inner.client.account_status().await {
            Ok(status) => {
                self.dispatch(Event::StatusLoaded(accounts_from_records(status.accounts)));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "status fetch failed");
                self.dispatch(Event::StatusFailed);
                Err(e.into())
            }
        }
    }

    /// Request a fresh pairing code and display it.
    pub async fn fetch_qr_code(&self) -> Result<(), CoreError> {
        self.dispatch(Event::PairingStarted);
        match self.inner.client.pairing_code().await {
            Ok(qr) => {
                self.dispatch(Event::QrIssued {
                    qr_code: qr.qr_code,
                    accounts: accounts_from_records(qr.existing_accounts),
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "QR fetch failed");
                self.dispatch(Event::QrFailed);
                Err(e.into())
            }
        }
    }

    /// Start pairing a new account: clear the current selection (arming
    /// the re-issue timer), show the QR surface, and fetch a code.
    pub async fn begin_pairing(&self) -> Result<(), CoreError> {
        self.dispatch(Event::PairingBegun);
        self.fetch_qr_code().await
    }

    /// Show or hide the pairing surface.
    pub fn set_qr_visible(&self, visible: bool) {
        self.dispatch(Event::QrVisibility(visible));
    }

    /// Select the dispatch account. When the gateway reports the target
    /// needs re-authentication, a pairing fetch is triggered
    /// immediately without further user action.
    pub async fn switch_account(&self, phone_number: &str) -> Result<(), CoreError> {
        self.dispatch(Event::SwitchStarted);
        match self.inner.client.switch_account(phone_number).await {
            Ok(resp) => {
                let effects = self.dispatch(Event::SwitchSucceeded {
                    phone_number: phone_number.to_owned(),
                    message: resp.message,
                    needs_reauth: resp.needs_reauth,
                });
                if effects.contains(&Effect::RequestPairing) {
                    if let Err(e) = self.fetch_qr_code().await {
                        warn!(error = %e, "re-auth pairing fetch failed");
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "account switch failed");
                self.dispatch(Event::SwitchFailed);
                Err(e.into())
            }
        }
    }

    /// Validate and dispatch the staged campaign.
    ///
    /// The validation gate rejects before any network traffic. On
    /// success the draft resets; on failure it is preserved so the
    /// user can retry without re-entering anything.
    pub async fn send_campaign(&self) -> Result<DispatchReport, CoreError> {
        let draft = {
            let state = self.inner.state.lock().expect("state lock poisoned");
            state.campaign.clone()
        };

        if !draft.is_valid() {
            self.dispatch(Event::ValidationRejected);
            return Err(CoreError::ValidationFailed {
                message: FIELDS_REQUIRED.to_owned(),
            });
        }

        self.dispatch(Event::DispatchStarted);
        match self.inner.client.send_campaign(&draft.to_request()).await {
            Ok(outcome) => {
                let report = DispatchReport::from(outcome);
                self.dispatch(Event::DispatchSucceeded(report));
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "campaign dispatch failed");
                self.dispatch(Event::DispatchFailed);
                Err(e.into())
            }
        }
    }

    /// Merge a partial update into the campaign draft.
    pub fn update_campaign(&self, patch: CampaignPatch) {
        self.dispatch(Event::CampaignEdited(patch));
    }

    /// Reset the campaign draft to empty.
    pub fn reset_campaign(&self) {
        self.dispatch(Event::CampaignCleared);
    }

    // ── Internals ────────────────────────────────────────────────────

    /// The single mutation entry point: run the reducer, publish the
    /// new snapshot, and start any timers the transition asked for.
    fn dispatch(&self, event: Event) -> Vec<Effect> {
        let effects = {
            let mut state = self.inner.state.lock().expect("state lock poisoned");
            let effects = state.apply(event);
            let snapshot = Arc::new(state.clone());
            self.inner.snapshot.send_modify(|snap| *snap = snapshot);
            effects
        };

        for effect in &effects {
            if let Effect::ScheduleAlertClear { generation } = *effect {
                self.schedule_alert_clear(generation);
            }
        }
        effects
    }

    /// One-shot banner expiry. A newer alert's dispatch replaces the
    /// generation, so a stale timer firing is a no-op in the reducer —
    /// at most one pending clear is ever effective.
    fn schedule_alert_clear(&self, generation: u64) {
        let session = self.clone();
        let ttl = self.inner.config.alert_ttl;
        let cancel = self.inner.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(ttl) => {
                    session.dispatch(Event::AlertExpired { generation });
                }
            }
        });
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic status poll. Failures raise the banner inside
/// `refresh_status` and never stop the loop — no backoff, no circuit
/// breaker; the next tick retries.
async fn status_poll_task(session: Session, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let _ = session.refresh_status().await;
            }
        }
    }
}

/// QR re-issue loop: while a code is displayed and unclaimed
/// (`reissue_armed`), invoke `reissue` every `period`. Disarms the
/// moment the guard drops and re-arms when it holds again.
///
/// The t=0 fetch belongs to the begin-pairing intent; this loop only
/// keeps an expiring code fresh.
pub(crate) async fn reissue_loop<F, Fut>(
    mut rx: watch::Receiver<Arc<SessionState>>,
    period: Duration,
    cancel: CancellationToken,
    mut reissue: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        // Wait for the guard to arm.
        while !rx.borrow_and_update().reissue_armed() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let mut interval = tokio::time::interval(period);
        interval.tick().await; // consume the immediate first tick
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !rx.borrow_and_update().reissue_armed() {
                        break;
                    }
                }
                _ = interval.tick() => reissue().await,
            }
        }
    }
}
