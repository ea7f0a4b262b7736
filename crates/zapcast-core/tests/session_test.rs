#![allow(clippy::unwrap_used)]
// Session flow tests against a mock gateway.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zapcast_core::state::{FIELDS_REQUIRED, SEND_FAILED, STATUS_LOAD_FAILED, SWITCH_FAILED};
use zapcast_core::{CampaignPatch, CoreError, Session, SessionConfig};

/// Mock gateway plus a session tuned with short timers for testing.
async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).expect("mock server URI");

    let mut config = SessionConfig::new(base_url, Some(SecretString::from("test-token")));
    config.timeout = Duration::from_secs(5);
    config.status_poll_interval = Duration::from_millis(100);
    config.qr_reissue_interval = Duration::from_millis(200);
    config.alert_ttl = Duration::from_millis(500);

    let session = Session::new(config).expect("session construction");
    (server, session)
}

fn account_json(phone: &str, authenticated: bool) -> serde_json::Value {
    json!({
        "phoneNumber": phone,
        "isAuthenticated": authenticated,
        "isActive": false,
        "campaignCount": 0
    })
}

async fn mount_status(server: &MockServer, accounts: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accounts": accounts })))
        .mount(server)
        .await;
}

fn valid_draft() -> CampaignPatch {
    CampaignPatch {
        campaign_name: Some("spring-launch".into()),
        message: Some("hello".into()),
        recipients: Some("+111\n+222".into()),
        media: None,
    }
}

#[tokio::test]
async fn first_status_load_selects_first_account() {
    let (server, session) = setup().await;
    mount_status(
        &server,
        json!([account_json("+111", true), account_json("+222", false)]),
    )
    .await;

    session.refresh_status().await.expect("status refresh");

    let snap = session.snapshot();
    assert_eq!(snap.accounts.len(), 2);
    assert_eq!(
        snap.current().map(|a| a.phone_number.as_str()),
        Some("+111")
    );
}

#[tokio::test]
async fn status_refresh_replaces_accounts_wholesale() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "accounts": [account_json("+111", true), account_json("+222", true)] }),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, json!([account_json("+333", true)])).await;

    session.refresh_status().await.expect("first refresh");
    session.refresh_status().await.expect("second refresh");

    // The old list is gone entirely, and the vanished selection falls
    // back to the first entry of the new list.
    let snap = session.snapshot();
    assert_eq!(snap.accounts.len(), 1);
    assert_eq!(
        snap.current().map(|a| a.phone_number.as_str()),
        Some("+333")
    );
}

#[tokio::test]
async fn status_failure_keeps_stale_accounts() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "accounts": [account_json("+111", true)] }),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.refresh_status().await.expect("first refresh");
    let err = session.refresh_status().await.expect_err("gateway is down");
    assert!(matches!(err, CoreError::Api { .. }));

    let snap = session.snapshot();
    assert_eq!(snap.accounts.len(), 1, "stale list survives the failure");
    assert_eq!(snap.error(), Some(STATUS_LOAD_FAILED));
}

#[tokio::test]
async fn validation_gate_rejects_before_any_network_traffic() {
    let (server, session) = setup().await;

    session.update_campaign(CampaignPatch {
        campaign_name: Some("spring-launch".into()),
        message: Some("   ".into()),
        recipients: Some("+111".into()),
        media: None,
    });

    let err = session.send_campaign().await.expect_err("blank message");
    assert!(matches!(err, CoreError::ValidationFailed { .. }));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "nothing may reach the gateway");

    let snap = session.snapshot();
    assert_eq!(snap.error(), Some(FIELDS_REQUIRED));
    assert_eq!(snap.campaign.campaign_name, "spring-launch");
}

#[tokio::test]
async fn successful_dispatch_reports_and_resets_draft() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/whatsapp/send"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "totalSent": 2, "totalFailed": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    session.update_campaign(valid_draft());
    let report = session.send_campaign().await.expect("dispatch");
    assert_eq!(report.total_sent, 2);
    assert_eq!(report.total_failed, 1);

    let snap = session.snapshot();
    assert_eq!(snap.success(), Some("Sent: 2, Failed: 1"));
    assert!(snap.campaign.campaign_name.is_empty(), "draft is reset");
    assert!(snap.campaign.recipients.is_empty());
}

#[tokio::test]
async fn failed_dispatch_preserves_the_draft() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/whatsapp/send"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    session.update_campaign(valid_draft());
    session.send_campaign().await.expect_err("gateway error");

    let snap = session.snapshot();
    assert_eq!(snap.error(), Some(SEND_FAILED));
    assert_eq!(snap.campaign.campaign_name, "spring-launch");
    assert_eq!(snap.campaign.recipients, "+111\n+222");
}

#[tokio::test]
async fn reauth_switch_fetches_a_pairing_code_immediately() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/whatsapp/switch-account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "message": "Switched, scan to re-authenticate", "needsReauth": true }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/qr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "qrCode": "qr-payload", "existingAccounts": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    session.switch_account("+111").await.expect("switch");

    let snap = session.snapshot();
    assert_eq!(snap.qr_code.as_deref(), Some("qr-payload"));
    assert!(snap.show_qr);
    assert_eq!(snap.success(), Some("Switched, scan to re-authenticate"));
}

#[tokio::test]
async fn switch_failure_keeps_the_previous_selection() {
    let (server, session) = setup().await;
    mount_status(&server, json!([account_json("+111", true)])).await;
    Mock::given(method("POST"))
        .and(path("/api/whatsapp/switch-account"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.refresh_status().await.expect("status refresh");
    session.switch_account("+999").await.expect_err("switch fails");

    let snap = session.snapshot();
    assert_eq!(
        snap.current().map(|a| a.phone_number.as_str()),
        Some("+111")
    );
    assert_eq!(snap.error(), Some(SWITCH_FAILED));
}

#[tokio::test]
async fn background_poll_keeps_refreshing() {
    let (server, session) = setup().await;
    mount_status(&server, json!([account_json("+111", true)])).await;

    session.start().await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    session.shutdown().await;

    let requests = server.received_requests().await.unwrap_or_default();
    let polls = requests
        .iter()
        .filter(|r| r.url.path() == "/api/whatsapp/status")
        .count();
    // Initial load plus ticks at 100ms, 200ms, 300ms.
    assert!(polls >= 3, "expected repeated polls, saw {polls}");
}

#[tokio::test]
async fn unclaimed_qr_code_is_reissued_periodically() {
    let (server, session) = setup().await;
    // No accounts: the pairing stays unclaimed for the whole test.
    mount_status(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/qr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "qrCode": "qr-payload", "existingAccounts": [] })),
        )
        .mount(&server)
        .await;

    session.start().await;
    session.begin_pairing().await.expect("pairing");
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.shutdown().await;

    let requests = server.received_requests().await.unwrap_or_default();
    let fetches = requests
        .iter()
        .filter(|r| r.url.path() == "/api/whatsapp/qr")
        .count();
    // Initial fetch plus re-issues at 200ms and 400ms.
    assert!(fetches >= 3, "expected periodic re-issue, saw {fetches}");
}

#[tokio::test]
async fn alerts_auto_clear_and_newer_alerts_restart_the_timer() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/whatsapp/switch-account"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Switched", "needsReauth": false })),
        )
        .mount(&server)
        .await;

    // t=0: error banner (clears at ~500ms).
    session.refresh_status().await.expect_err("gateway is down");
    assert_eq!(session.snapshot().error(), Some(STATUS_LOAD_FAILED));

    // t=250ms: success banner supersedes it (clears at ~750ms).
    tokio::time::sleep(Duration::from_millis(250)).await;
    session.switch_account("+111").await.expect("switch");
    assert_eq!(session.snapshot().success(), Some("Switched"));

    // t=600ms: the first timer has fired but must not touch the
    // newer banner.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(session.snapshot().success(), Some("Switched"));

    // t=900ms: the second timer has cleared it.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let snap = session.snapshot();
    assert!(snap.error().is_none() && snap.success().is_none());
}

#[tokio::test]
async fn begin_pairing_clears_selection_and_shows_the_code() {
    let (server, session) = setup().await;
    mount_status(&server, json!([account_json("+111", true)])).await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/qr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "qrCode": "qr-payload", "existingAccounts": [account_json("+111", true)] }),
        ))
        .mount(&server)
        .await;

    session.refresh_status().await.expect("status refresh");
    session.begin_pairing().await.expect("pairing");

    let snap = session.snapshot();
    assert!(snap.current().is_none(), "new pairing has no selection");
    assert!(snap.show_qr);
    assert_eq!(snap.qr_code.as_deref(), Some("qr-payload"));
    assert!(snap.reissue_armed());
}

#[tokio::test]
async fn qr_fetch_failure_leaves_visibility_untouched() {
    let (server, session) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/whatsapp/qr"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    session.begin_pairing().await.expect_err("qr fetch fails");

    let snap = session.snapshot();
    assert!(snap.show_qr, "surface stays up so the user can retry");
    assert_eq!(
        snap.error(),
        Some(zapcast_core::state::QR_FETCH_FAILED)
    );
}
