//! Campaign dispatch endpoint.

use reqwest::multipart::{Form, Part};

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::{CampaignRequest, SendOutcome};

impl GatewayClient {
    /// Submit a campaign: `POST /api/whatsapp/send` (multipart).
    ///
    /// Field names match the gateway contract: `campaignName`, `message`,
    /// `users`, and optionally `mediaFile`.
    pub async fn send_campaign(&self, request: &CampaignRequest) -> Result<SendOutcome, Error> {
        let mut form = Form::new()
            .text("campaignName", request.campaign_name.clone())
            .text("message", request.message.clone())
            .text("users", request.users.clone());

        if let Some(ref media) = request.media {
            let mut part = Part::bytes(media.bytes.clone()).file_name(media.file_name.clone());
            if let Some(ref mime) = media.content_type {
                part = part.mime_str(mime).map_err(|e| Error::InvalidRequest {
                    message: format!("invalid media content type '{mime}': {e}"),
                })?;
            }
            form = form.part("mediaFile", part);
        }

        self.post_multipart("send", form).await
    }
}
