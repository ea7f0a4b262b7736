//! Account endpoints: status listing, QR pairing, active-account switch.

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::{QrResponse, StatusResponse, SwitchRequest, SwitchResponse};

impl GatewayClient {
    /// Fetch the current account list: `GET /api/whatsapp/status`.
    pub async fn account_status(&self) -> Result<StatusResponse, Error> {
        self.get("status").await
    }

    /// Request a fresh pairing code: `GET /api/whatsapp/qr`.
    ///
    /// The gateway returns the QR payload together with a snapshot of the
    /// accounts it already knows about.
    pub async fn pairing_code(&self) -> Result<QrResponse, Error> {
        self.get("qr").await
    }

    /// Select the account used for dispatch:
    /// `POST /api/whatsapp/switch-account`.
    pub async fn switch_account(&self, phone_number: &str) -> Result<SwitchResponse, Error> {
        let body = SwitchRequest {
            phone_number: phone_number.to_owned(),
        };
        self.post("switch-account", &body).await
    }
}
