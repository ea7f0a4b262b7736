//! Domain model: accounts, campaign drafts, dispatch outcomes.

use serde::Serialize;

use zapcast_api::{AccountRecord, CampaignRequest, MediaUpload, SendOutcome};

// ── Account ─────────────────────────────────────────────────────────

/// One messaging identity known to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Unique key within the account list.
    pub phone_number: String,
    /// Whether the account holds a valid session.
    pub is_authenticated: bool,
    /// Whether the account is selected for dispatch on the gateway side.
    pub is_active: bool,
    /// Campaigns sent through this account (informational).
    pub campaign_count: u64,
    /// Free-text status annotation from the gateway.
    pub status_message: Option<String>,
}

impl Account {
    /// Whether the account is eligible for dispatch.
    ///
    /// True when `is_authenticated` is set, or when the status text
    /// carries a reconnection notice. The gateway updates the message
    /// text before the boolean when a session reconnects, so the text
    /// match is load-bearing — dropping it would mark freshly
    /// reconnected accounts as offline for several poll cycles.
    pub fn is_connected(&self) -> bool {
        self.is_authenticated
            || self
                .status_message
                .as_deref()
                .is_some_and(|m| m.contains("Reconnected"))
    }
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            phone_number: record.phone_number,
            is_authenticated: record.is_authenticated,
            is_active: record.is_active,
            campaign_count: record.campaign_count,
            status_message: record.message,
        }
    }
}

/// Convert a wire-level account list wholesale.
pub(crate) fn accounts_from_records(records: Vec<AccountRecord>) -> Vec<Account> {
    records.into_iter().map(Account::from).collect()
}

// ── Campaign draft ──────────────────────────────────────────────────

/// A user-authored campaign, staged before dispatch.
#[derive(Debug, Clone, Default)]
pub struct CampaignDraft {
    pub campaign_name: String,
    pub message: String,
    /// Newline-delimited recipient identifiers.
    pub recipients: String,
    /// Optional attachment; never required.
    pub media: Option<MediaAttachment>,
}

impl CampaignDraft {
    /// All three text fields must be non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.campaign_name.trim().is_empty()
            && !self.message.trim().is_empty()
            && !self.recipients.trim().is_empty()
    }

    /// Number of non-blank recipient lines.
    pub fn recipient_count(&self) -> usize {
        self.recipients
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()
    }

    /// Build the wire request for this draft.
    pub(crate) fn to_request(&self) -> CampaignRequest {
        CampaignRequest {
            campaign_name: self.campaign_name.clone(),
            message: self.message.clone(),
            users: self.recipients.clone(),
            media: self.media.as_ref().map(|m| MediaUpload {
                file_name: m.file_name.clone(),
                content_type: m.content_type.clone(),
                bytes: m.bytes.clone(),
            }),
        }
    }
}

/// A staged media attachment.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Partial update to the campaign draft. `None` fields are untouched;
/// `media` uses a double Option so it can be cleared explicitly.
#[derive(Debug, Clone, Default)]
pub struct CampaignPatch {
    pub campaign_name: Option<String>,
    pub message: Option<String>,
    pub recipients: Option<String>,
    pub media: Option<Option<MediaAttachment>>,
}

// ── Dispatch report ─────────────────────────────────────────────────

/// Aggregate outcome of a campaign submission.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DispatchReport {
    pub total_sent: u64,
    pub total_failed: u64,
}

impl From<SendOutcome> for DispatchReport {
    fn from(outcome: SendOutcome) -> Self {
        Self {
            total_sent: outcome.total_sent,
            total_failed: outcome.total_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(authenticated: bool, message: Option<&str>) -> Account {
        Account {
            phone_number: "+15550001111".into(),
            is_authenticated: authenticated,
            is_active: false,
            campaign_count: 0,
            status_message: message.map(str::to_owned),
        }
    }

    #[test]
    fn authenticated_account_is_connected() {
        assert!(account(true, None).is_connected());
    }

    #[test]
    fn reconnection_notice_counts_as_connected() {
        let acct = account(false, Some("Reconnected to WhatsApp account XYZ"));
        assert!(acct.is_connected());
    }

    #[test]
    fn pending_message_does_not_count_as_connected() {
        assert!(!account(false, Some("pending")).is_connected());
        assert!(!account(false, None).is_connected());
    }

    #[test]
    fn draft_validation_requires_all_text_fields() {
        let mut draft = CampaignDraft {
            campaign_name: "Promo".into(),
            message: "Hi".into(),
            recipients: "+1\n+2".into(),
            media: None,
        };
        assert!(draft.is_valid());

        draft.campaign_name = "   ".into();
        assert!(!draft.is_valid());

        draft.campaign_name = "Promo".into();
        draft.recipients = "\n\n".into();
        assert!(!draft.is_valid());
    }

    #[test]
    fn media_is_never_required() {
        let draft = CampaignDraft {
            campaign_name: "Promo".into(),
            message: "Hi".into(),
            recipients: "+1".into(),
            media: None,
        };
        assert!(draft.is_valid());
    }

    #[test]
    fn recipient_count_skips_blank_lines() {
        let draft = CampaignDraft {
            recipients: "+1\n\n  \n+2\n+3".into(),
            ..CampaignDraft::default()
        };
        assert_eq!(draft.recipient_count(), 3);
    }
}
