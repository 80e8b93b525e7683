//! Shell-endpoint API client.
//!
//! One REST call against the Mist cloud: ask for a shell on a device,
//! get back the WebSocket URL that tunnels to it.

use std::time::Duration;

use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::Config;
use crate::error::ApiError;

/// Response from the shell-endpoint call.
///
/// The URL embeds a single-use session credential, so it must never be
/// logged or written anywhere durable.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellEndpoint {
    /// WebSocket URL that attaches to the device shell.
    pub url: String,

    /// Opaque session identifier, when the cloud includes one.
    #[serde(default)]
    pub session: Option<String>,

    /// Expiry timestamp, when the cloud includes one.
    #[serde(default)]
    pub expiry: Option<u64>,
}

/// Minimal client for the Mist REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl ApiClient {
    /// Client against `base_url` (scheme included; trailing slashes are
    /// trimmed).
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Client for the API host a [`Config`] resolved.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            format!("https://{}", config.api_host),
            SecretString::from(config.token.expose_secret().to_owned()),
        )
    }

    /// Ask the cloud to open a shell on `device_id` and hand back the
    /// WebSocket endpoint for it.
    pub async fn shell_endpoint(
        &self,
        site_id: &str,
        device_id: &str,
    ) -> Result<ShellEndpoint, ApiError> {
        let url = format!(
            "{}/api/v1/sites/{}/devices/{}/shell",
            self.base_url, site_id, device_id
        );
        debug!("requesting shell endpoint for device {device_id}");

        let response = self
            .http
            .post(&url)
            .header(
                AUTHORIZATION,
                format!("Token {}", self.token.expose_secret()),
            )
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let endpoint = response.json::<ShellEndpoint>().await?;
        info!("obtained shell endpoint for device {device_id}");
        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_shell_endpoint_posts_token_and_parses_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/sites/site-1/devices/dev-1/shell"))
            .and(header("authorization", "Token sekret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "wss://ep-hub.mist.com/ws-shell?token=abc",
                "session": "s-123",
            })))
            .mount(&server)
            .await;

        let client =
            ApiClient::new(server.uri(), SecretString::from("sekret".to_owned())).unwrap();
        let endpoint = client.shell_endpoint("site-1", "dev-1").await.unwrap();

        assert_eq!(endpoint.url, "wss://ep-hub.mist.com/ws-shell?token=abc");
        assert_eq!(endpoint.session.as_deref(), Some("s-123"));
        assert_eq!(endpoint.expiry, None);
    }

    #[tokio::test]
    async fn test_shell_endpoint_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), SecretString::from("bad".to_owned())).unwrap();
        let err = client.shell_endpoint("site-1", "dev-1").await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected status error, got {other}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            ApiClient::new("https://api.mist.com///", SecretString::from("t".to_owned())).unwrap();
        assert_eq!(client.base_url, "https://api.mist.com");
    }
}
