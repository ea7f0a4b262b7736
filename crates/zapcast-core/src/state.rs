// ── Session state machine ──
//
// All session state lives in `SessionState` and is mutated through a
// single entry point: `apply(Event) -> Vec<Effect>`. The reducer is
// pure (no I/O, no timers), so every transition is testable in
// isolation; `Session` owns the surrounding plumbing and runs the
// returned effects.

use crate::model::{Account, CampaignDraft, CampaignPatch, DispatchReport};

// ── Fixed alert strings ─────────────────────────────────────────────
// One fixed string per operation. The underlying error detail is logged
// by the session, never shown in the banner.

pub const STATUS_LOAD_FAILED: &str = "Failed to load account statuses";
pub const QR_FETCH_FAILED: &str = "Failed to fetch QR code";
pub const SWITCH_FAILED: &str = "Failed to switch account";
pub const SEND_FAILED: &str = "Failed to send campaign";
pub const FIELDS_REQUIRED: &str = "Please fill in all required fields";

// ── Phase ───────────────────────────────────────────────────────────

/// What the session is currently doing.
///
/// Failures are not a phase: a failed operation drops back to `Ready`
/// with the error carried by the alert banner, so every state is
/// recoverable by the next user action or poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No accounts loaded yet.
    Idle,
    /// A status fetch is in flight.
    Listing,
    /// Accounts loaded; none or one selected.
    Ready,
    /// A pairing-code fetch is in flight.
    PairingRequested,
    /// A code is displayed; waiting for a scan to complete pairing.
    AwaitingScan,
    /// An active-account change is in flight.
    Switching,
    /// A campaign submission is in flight.
    Dispatching,
}

// ── Alert ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Success,
}

/// The banner: at most one visible message, error or success, with a
/// generation counter so the auto-clear timer of a superseded alert
/// cannot wipe a newer one.
#[derive(Debug, Clone)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
    pub generation: u64,
}

// ── Events & effects ────────────────────────────────────────────────

/// Everything that can change the session state.
#[derive(Debug)]
pub enum Event {
    // Status polling
    StatusStarted,
    StatusLoaded(Vec<Account>),
    StatusFailed,

    // Pairing
    /// User intent: start pairing a new account. Clears the current
    /// selection (arming the re-issue timer) and shows the QR surface.
    PairingBegun,
    PairingStarted,
    QrIssued {
        qr_code: String,
        accounts: Vec<Account>,
    },
    QrFailed,
    QrVisibility(bool),

    // Account switch
    SwitchStarted,
    SwitchSucceeded {
        phone_number: String,
        message: String,
        needs_reauth: bool,
    },
    SwitchFailed,

    // Campaign dispatch
    DispatchStarted,
    DispatchSucceeded(DispatchReport),
    DispatchFailed,
    ValidationRejected,
    CampaignEdited(CampaignPatch),
    CampaignCleared,

    // Timers
    AlertExpired {
        generation: u64,
    },
}

/// Side effects requested by a transition, executed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start the 5s one-shot that clears the alert with this generation.
    ScheduleAlertClear { generation: u64 },
    /// Immediately re-issue a pairing fetch (switch said `needsReauth`).
    RequestPairing,
}

// ── State ───────────────────────────────────────────────────────────

/// The connection state store. Rebuilt wholesale by status polls;
/// owned by a single writer (the session).
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    /// Order follows the gateway response; not guaranteed stable.
    pub accounts: Vec<Account>,
    /// Phone number of the account selected for dispatch.
    pub current_account: Option<String>,
    /// Opaque pairing-code payload, present while pairing is pending.
    pub qr_code: Option<String>,
    /// Visibility of the pairing surface. Independent of `qr_code` —
    /// it can be shown while the code is still loading.
    pub show_qr: bool,
    pub alert: Option<Alert>,
    pub campaign: CampaignDraft,
    /// Monotonic alert counter; newer alerts invalidate older timers.
    alert_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            accounts: Vec::new(),
            current_account: None,
            qr_code: None,
            show_qr: false,
            alert: None,
            campaign: CampaignDraft::default(),
            alert_seq: 0,
        }
    }
}

impl SessionState {
    /// Whether any request is in flight.
    pub fn loading(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Ready | Phase::AwaitingScan)
    }

    /// The visible error text, if the banner currently shows one.
    pub fn error(&self) -> Option<&str> {
        match self.alert {
            Some(Alert {
                kind: AlertKind::Error,
                ref text,
                ..
            }) => Some(text),
            _ => None,
        }
    }

    /// The visible success text, if the banner currently shows one.
    pub fn success(&self) -> Option<&str> {
        match self.alert {
            Some(Alert {
                kind: AlertKind::Success,
                ref text,
                ..
            }) => Some(text),
            _ => None,
        }
    }

    /// The currently selected account, resolved against the list.
    pub fn current(&self) -> Option<&Account> {
        let phone = self.current_account.as_deref()?;
        self.accounts.iter().find(|a| a.phone_number == phone)
    }

    /// Guard for the QR re-issue timer: a code is displayed and no
    /// account has claimed it yet.
    pub fn reissue_armed(&self) -> bool {
        self.show_qr && self.current_account.is_none()
    }

    // ── Reducer ──────────────────────────────────────────────────────

    /// Apply one event. Returns the effects the session must run.
    #[allow(clippy::too_many_lines)]
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            // ── Status polling ───────────────────────────────────────
            Event::StatusStarted => {
                if matches!(self.phase, Phase::Idle | Phase::Ready) {
                    self.phase = Phase::Listing;
                }
                Vec::new()
            }
            Event::StatusLoaded(accounts) => {
                // Wholesale replacement: the store always mirrors the
                // latest poll exactly.
                self.accounts = accounts;
                self.select_default_account();
                if self.phase == Phase::Listing {
                    self.phase = Phase::Ready;
                }
                Vec::new()
            }
            Event::StatusFailed => {
                // Stale data stays; polling continues regardless.
                if self.phase == Phase::Listing {
                    self.phase = Phase::Ready;
                }
                vec![self.raise(AlertKind::Error, STATUS_LOAD_FAILED.to_owned())]
            }

            // ── Pairing ──────────────────────────────────────────────
            Event::PairingBegun => {
                self.current_account = None;
                self.show_qr = true;
                Vec::new()
            }
            Event::PairingStarted => {
                self.phase = Phase::PairingRequested;
                Vec::new()
            }
            Event::QrIssued { qr_code, accounts } => {
                self.qr_code = Some(qr_code);
                self.accounts = accounts;
                self.show_qr = true;
                self.phase = Phase::AwaitingScan;
                Vec::new()
            }
            Event::QrFailed => {
                // show_qr is deliberately left as-is; the surface keeps
                // whatever code it had.
                self.phase = Phase::Ready;
                vec![self.raise(AlertKind::Error, QR_FETCH_FAILED.to_owned())]
            }
            Event::QrVisibility(visible) => {
                self.show_qr = visible;
                if !visible && self.phase == Phase::AwaitingScan {
                    self.phase = Phase::Ready;
                }
                Vec::new()
            }

            // ── Account switch ───────────────────────────────────────
            Event::SwitchStarted => {
                self.phase = Phase::Switching;
                Vec::new()
            }
            Event::SwitchSucceeded {
                phone_number,
                message,
                needs_reauth,
            } => {
                self.current_account = Some(phone_number);
                self.phase = Phase::Ready;
                let mut effects = vec![self.raise(AlertKind::Success, message)];
                if needs_reauth {
                    effects.push(Effect::RequestPairing);
                }
                effects
            }
            Event::SwitchFailed => {
                // Selection unchanged on failure.
                self.phase = Phase::Ready;
                vec![self.raise(AlertKind::Error, SWITCH_FAILED.to_owned())]
            }

            // ── Campaign dispatch ────────────────────────────────────
            Event::DispatchStarted => {
                self.phase = Phase::Dispatching;
                Vec::new()
            }
            Event::DispatchSucceeded(report) => {
                self.phase = Phase::Ready;
                self.campaign = CampaignDraft::default();
                let text = format!(
                    "Sent: {}, Failed: {}",
                    report.total_sent, report.total_failed
                );
                vec![self.raise(AlertKind::Success, text)]
            }
            Event::DispatchFailed => {
                // Draft preserved so the user can retry without
                // re-entering anything.
                self.phase = Phase::Ready;
                vec![self.raise(AlertKind::Error, SEND_FAILED.to_owned())]
            }
            Event::ValidationRejected => {
                vec![self.raise(AlertKind::Error, FIELDS_REQUIRED.to_owned())]
            }
            Event::CampaignEdited(patch) => {
                if let Some(name) = patch.campaign_name {
                    self.campaign.campaign_name = name;
                }
                if let Some(message) = patch.message {
                    self.campaign.message = message;
                }
                if let Some(recipients) = patch.recipients {
                    self.campaign.recipients = recipients;
                }
                if let Some(media) = patch.media {
                    self.campaign.media = media;
                }
                Vec::new()
            }
            Event::CampaignCleared => {
                self.campaign = CampaignDraft::default();
                Vec::new()
            }

            // ── Timers ───────────────────────────────────────────────
            Event::AlertExpired { generation } => {
                // Only the newest alert's timer may clear the banner.
                if self
                    .alert
                    .as_ref()
                    .is_some_and(|a| a.generation == generation)
                {
                    self.alert = None;
                }
                Vec::new()
            }
        }
    }

    /// Keep the selection valid against the current list: when nothing
    /// is selected, or the selected number vanished from the latest
    /// poll, fall back to the first account the gateway reported.
    fn select_default_account(&mut self) {
        let selection_alive = self
            .current_account
            .as_deref()
            .is_some_and(|phone| self.accounts.iter().any(|a| a.phone_number == phone));
        if !selection_alive {
            self.current_account = self.accounts.first().map(|a| a.phone_number.clone());
        }
    }

    /// Replace the banner and request a fresh auto-clear timer.
    fn raise(&mut self, kind: AlertKind, text: String) -> Effect {
        self.alert_seq += 1;
        let generation = self.alert_seq;
        self.alert = Some(Alert {
            kind,
            text,
            generation,
        });
        Effect::ScheduleAlertClear { generation }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Account;

    fn account(phone: &str) -> Account {
        Account {
            phone_number: phone.into(),
            is_authenticated: true,
            is_active: false,
            campaign_count: 0,
            status_message: None,
        }
    }

    #[test]
    fn status_polls_replace_accounts_wholesale() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1"), account("+2")]));
        assert_eq!(state.accounts.len(), 2);

        // A later poll with a shorter list must not accumulate.
        state.apply(Event::StatusLoaded(vec![account("+3")]));
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.accounts[0].phone_number, "+3");
    }

    #[test]
    fn first_account_selected_by_default() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1"), account("+2")]));
        assert_eq!(state.current_account.as_deref(), Some("+1"));

        // An existing selection is never overridden by a poll.
        state.apply(Event::StatusLoaded(vec![account("+2"), account("+1")]));
        assert_eq!(state.current_account.as_deref(), Some("+1"));
    }

    #[test]
    fn vanished_selection_falls_back_to_first() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1"), account("+2")]));
        assert_eq!(state.current_account.as_deref(), Some("+1"));

        state.apply(Event::StatusLoaded(vec![account("+2")]));
        assert_eq!(state.current_account.as_deref(), Some("+2"));

        state.apply(Event::StatusLoaded(Vec::new()));
        assert!(state.current_account.is_none());
    }

    #[test]
    fn empty_list_selects_nothing() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(Vec::new()));
        assert!(state.current_account.is_none());
    }

    #[test]
    fn status_failure_keeps_stale_accounts() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1")]));

        let effects = state.apply(Event::StatusFailed);
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.error(), Some(STATUS_LOAD_FAILED));
        assert_eq!(state.phase, Phase::Ready);
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleAlertClear { .. }]
        ));
    }

    #[test]
    fn qr_issue_overwrites_accounts_and_shows_surface() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1")]));
        state.apply(Event::QrIssued {
            qr_code: "data:image/png;base64,QQ".into(),
            accounts: vec![account("+1"), account("+2")],
        });

        assert!(state.show_qr);
        assert_eq!(state.qr_code.as_deref(), Some("data:image/png;base64,QQ"));
        assert_eq!(state.accounts.len(), 2);
        assert_eq!(state.phase, Phase::AwaitingScan);
    }

    #[test]
    fn qr_failure_leaves_visibility_untouched() {
        let mut state = SessionState::default();
        state.apply(Event::PairingBegun);
        assert!(state.show_qr);

        state.apply(Event::QrFailed);
        assert!(state.show_qr);
        assert_eq!(state.error(), Some(QR_FETCH_FAILED));
    }

    #[test]
    fn pairing_begun_arms_reissue_guard() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1")]));
        assert!(!state.reissue_armed());

        state.apply(Event::PairingBegun);
        assert!(state.reissue_armed());

        // Any selection disarms the guard.
        state.apply(Event::StatusLoaded(vec![account("+1")]));
        assert!(!state.reissue_armed());
    }

    #[test]
    fn switch_with_reauth_requests_pairing() {
        let mut state = SessionState::default();
        let effects = state.apply(Event::SwitchSucceeded {
            phone_number: "+1".into(),
            message: "ok".into(),
            needs_reauth: true,
        });

        assert_eq!(state.current_account.as_deref(), Some("+1"));
        assert_eq!(state.success(), Some("ok"));
        assert!(effects.contains(&Effect::RequestPairing));
    }

    #[test]
    fn switch_without_reauth_does_not_request_pairing() {
        let mut state = SessionState::default();
        let effects = state.apply(Event::SwitchSucceeded {
            phone_number: "+1".into(),
            message: "ok".into(),
            needs_reauth: false,
        });
        assert!(!effects.contains(&Effect::RequestPairing));
    }

    #[test]
    fn switch_failure_preserves_selection() {
        let mut state = SessionState::default();
        state.apply(Event::StatusLoaded(vec![account("+1")]));

        state.apply(Event::SwitchFailed);
        assert_eq!(state.current_account.as_deref(), Some("+1"));
        assert_eq!(state.error(), Some(SWITCH_FAILED));
    }

    #[test]
    fn dispatch_success_resets_draft() {
        let mut state = SessionState::default();
        state.apply(Event::CampaignEdited(crate::model::CampaignPatch {
            campaign_name: Some("Promo".into()),
            message: Some("Hi".into()),
            recipients: Some("+1\n+2".into()),
            media: None,
        }));

        state.apply(Event::DispatchSucceeded(DispatchReport {
            total_sent: 2,
            total_failed: 0,
        }));

        assert_eq!(state.success(), Some("Sent: 2, Failed: 0"));
        assert!(state.campaign.campaign_name.is_empty());
        assert!(state.campaign.message.is_empty());
        assert!(state.campaign.recipients.is_empty());
        assert!(state.campaign.media.is_none());
    }

    #[test]
    fn dispatch_failure_preserves_draft() {
        let mut state = SessionState::default();
        state.apply(Event::CampaignEdited(crate::model::CampaignPatch {
            campaign_name: Some("Promo".into()),
            message: Some("Hi".into()),
            recipients: Some("+1".into()),
            media: None,
        }));

        state.apply(Event::DispatchFailed);

        assert_eq!(state.error(), Some(SEND_FAILED));
        assert_eq!(state.campaign.campaign_name, "Promo");
        assert_eq!(state.campaign.recipients, "+1");
    }

    #[test]
    fn stale_alert_timer_cannot_clear_newer_alert() {
        let mut state = SessionState::default();

        let first = match state.apply(Event::StatusFailed).as_slice() {
            [Effect::ScheduleAlertClear { generation }] => *generation,
            other => panic!("unexpected effects: {other:?}"),
        };
        let second = match state
            .apply(Event::DispatchSucceeded(DispatchReport {
                total_sent: 1,
                total_failed: 0,
            }))
            .as_slice()
        {
            [Effect::ScheduleAlertClear { generation }] => *generation,
            other => panic!("unexpected effects: {other:?}"),
        };

        // First timer fires after being superseded: no-op.
        state.apply(Event::AlertExpired { generation: first });
        assert!(state.alert.is_some());

        // The live timer clears the banner.
        state.apply(Event::AlertExpired { generation: second });
        assert!(state.alert.is_none());
    }

    #[test]
    fn error_and_success_are_mutually_exclusive() {
        let mut state = SessionState::default();
        state.apply(Event::StatusFailed);
        assert!(state.error().is_some());
        assert!(state.success().is_none());

        state.apply(Event::SwitchSucceeded {
            phone_number: "+1".into(),
            message: "done".into(),
            needs_reauth: false,
        });
        assert!(state.error().is_none());
        assert_eq!(state.success(), Some("done"));
    }

    #[test]
    fn validation_rejection_raises_fixed_message() {
        let mut state = SessionState::default();
        state.apply(Event::ValidationRejected);
        assert_eq!(state.error(), Some(FIELDS_REQUIRED));
    }
}
