// Gateway HTTP client
//
// Wraps `reqwest::Client` with URL construction, bearer-token
// application, and error-response normalization. Endpoint modules
// (accounts, campaigns) are implemented as inherent methods via
// separate files to keep this module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Gateways report failures as `{"error": "..."}` with a non-2xx status.
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Raw HTTP client for the campaign gateway API.
///
/// Attaches `Authorization: Bearer <token>` to every request, fails fast
/// with [`Error::MissingToken`] when no token is configured, and maps
/// 401 responses to [`Error::Authentication`]. All methods return the
/// decoded JSON body.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl GatewayClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root (e.g. `https://gateway.example.com`);
    /// endpoint paths are appended to it. `token` is the ambient bearer
    /// credential — `None` means every call fails with `MissingToken`,
    /// which callers surface as an auth problem.
    pub fn new(
        base_url: Url,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/whatsapp/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/whatsapp/{path}"))?)
    }

    /// The bearer token, or `MissingToken` when none is configured.
    fn bearer(&self) -> Result<&str, Error> {
        self.token
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send an authenticated POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send an authenticated POST request with a multipart body.
    ///
    /// No explicit content-type header — reqwest computes the multipart
    /// boundary itself.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url} (multipart)");

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.bearer()?)
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Normalize a gateway response: 401 → `Authentication`, other
    /// non-2xx → `Api` with the body's `error` field (else a generic
    /// status string), 2xx → decoded `T`.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            let message = extract_error_field(&body)
                .unwrap_or_else(|| "token rejected by gateway".to_owned());
            return Err(Error::Authentication { message });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = extract_error_field(&body)
                .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Pull the `error` field out of a failure body, if the gateway sent one.
fn extract_error_field(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::extract_error_field;

    #[test]
    fn extracts_error_field_when_present() {
        let msg = extract_error_field(r#"{"error":"quota exceeded"}"#);
        assert_eq!(msg.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn ignores_bodies_without_error_field() {
        assert!(extract_error_field(r#"{"detail":"nope"}"#).is_none());
        assert!(extract_error_field("not json").is_none());
        assert!(extract_error_field(r#"{"error":""}"#).is_none());
    }
}
