//! HTTP implementation of the backend gateway
//!
//! Talks to the Crosspub REST backend over JSON. The backend tracks login
//! state in a session cookie, so the underlying client carries a cookie
//! store for the lifetime of the gateway. Error responses use an
//! `{"error": "..."}` envelope; that message is surfaced verbatim as a
//! [`GatewayError::Rejected`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::credentials::CredentialFields;
use crate::error::{GatewayError, Result};
use crate::gateway::{BackendGateway, PublishResponse};
use crate::types::{
    CredentialStatusMap, NewPost, Platform, PlatformResult, Post, SocialAccount,
};

/// Gateway backed by the Crosspub REST API
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a gateway for the API rooted at `base_url`.
    ///
    /// A trailing slash on `base_url` is tolerated and stripped.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(GatewayError::from)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Deserialize a success body, or surface the backend's error message
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body).into());
        }
        let value = resp.json().await.map_err(GatewayError::from)?;
        Ok(value)
    }

    /// Like [`Self::read_json`] for endpoints whose success body we ignore
    async fn read_ok(resp: reqwest::Response) -> Result<()> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body).into());
        }
        Ok(())
    }
}

/// Extract the backend's `{"error": "..."}` message without altering it.
/// Falls back to the raw body, then to a status line for empty bodies.
fn rejection(status: u16, body: &str) -> GatewayError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("Request failed with status {}", status),
        Err(_) => body.trim().to_string(),
    };
    GatewayError::rejected(status, message)
}

#[derive(Debug, Deserialize)]
struct PostEnvelope {
    post: Post,
}

#[derive(Debug, Deserialize)]
struct PostListEnvelope {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct AccountListEnvelope {
    accounts: Vec<SocialAccount>,
}

#[derive(Debug, Deserialize)]
struct ConnectEnvelope {
    auth_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    status: CredentialStatusMap,
}

/// Per-platform publish outcome as the backend reports it
#[derive(Debug, Deserialize)]
struct WireResult {
    platform: Platform,
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl From<WireResult> for PlatformResult {
    fn from(wire: WireResult) -> Self {
        PlatformResult {
            platform: wire.platform,
            success: wire.status == "success",
            error: wire.error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePublishResponse {
    post: Post,
    results: Vec<WireResult>,
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn create_post(&self, input: &NewPost) -> Result<Post> {
        tracing::debug!(platforms = input.platforms.len(), "Creating post");
        let resp = self
            .client
            .post(self.url("/posts"))
            .json(input)
            .send()
            .await
            .map_err(GatewayError::from)?;
        let envelope: PostEnvelope = Self::read_json(resp).await?;
        tracing::info!(post_id = %envelope.post.id, "Post created");
        Ok(envelope.post)
    }

    async fn publish_post(&self, post_id: &str) -> Result<PublishResponse> {
        tracing::debug!(post_id, "Publishing post");
        let resp = self
            .client
            .post(self.url(&format!("/posts/{}/publish", post_id)))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let wire: WirePublishResponse = Self::read_json(resp).await?;
        let results: Vec<PlatformResult> =
            wire.results.into_iter().map(PlatformResult::from).collect();
        tracing::info!(
            post_id,
            succeeded = results.iter().filter(|r| r.success).count(),
            total = results.len(),
            "Publish results received"
        );
        Ok(PublishResponse {
            post: wire.post,
            results,
        })
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let resp = self
            .client
            .get(self.url("/posts"))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let envelope: PostListEnvelope = Self::read_json(resp).await?;
        Ok(envelope.posts)
    }

    async fn list_accounts(&self) -> Result<Vec<SocialAccount>> {
        let resp = self
            .client
            .get(self.url("/social-accounts"))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let envelope: AccountListEnvelope = Self::read_json(resp).await?;
        Ok(envelope.accounts)
    }

    async fn begin_connect(&self, platform: Platform) -> Result<String> {
        tracing::debug!(%platform, "Requesting authorization URL");
        let resp = self
            .client
            .post(self.url(&format!("/social-accounts/connect/{}", platform)))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let envelope: ConnectEnvelope = Self::read_json(resp).await?;
        Ok(envelope.auth_url)
    }

    async fn disconnect_account(&self, account_id: &str) -> Result<()> {
        tracing::debug!(account_id, "Disconnecting account");
        let resp = self
            .client
            .delete(self.url(&format!("/social-accounts/{}", account_id)))
            .send()
            .await
            .map_err(GatewayError::from)?;
        Self::read_ok(resp).await
    }

    async fn save_credentials(&self, platform: Platform, fields: &CredentialFields) -> Result<()> {
        tracing::debug!(%platform, fields = fields.len(), "Saving credentials");
        let resp = self
            .client
            .post(self.url(&format!("/social-accounts/credentials/{}", platform)))
            .json(&fields.expose_json())
            .send()
            .await
            .map_err(GatewayError::from)?;
        Self::read_ok(resp).await
    }

    async fn credential_status(&self) -> Result<CredentialStatusMap> {
        let resp = self
            .client
            .get(self.url("/social-accounts/credentials/status"))
            .send()
            .await
            .map_err(GatewayError::from)?;
        let envelope: StatusEnvelope = Self::read_json(resp).await?;
        Ok(envelope.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let gateway = HttpGateway::new("http://localhost:5000/").unwrap();
        assert_eq!(gateway.url("/posts"), "http://localhost:5000/posts");
    }

    #[test]
    fn test_rejection_prefers_error_envelope() {
        let err = rejection(400, r#"{"error": "Token scaduto"}"#);
        assert_eq!(format!("{}", err), "Token scaduto");
    }

    #[test]
    fn test_rejection_falls_back_to_raw_body() {
        let err = rejection(502, "Bad Gateway");
        assert_eq!(format!("{}", err), "Bad Gateway");
    }

    #[test]
    fn test_rejection_empty_body_reports_status() {
        let err = rejection(500, "");
        assert_eq!(format!("{}", err), "Request failed with status 500");
    }

    #[test]
    fn test_wire_result_maps_status_string() {
        let wire = WireResult {
            platform: Platform::Twitter,
            status: "error".to_string(),
            error: Some("rate limited".to_string()),
        };
        let result = PlatformResult::from(wire);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("rate limited"));
    }
}
