//! HTTP client for the provisioning service.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{
    CreateMailboxRequest, DeleteOutcome, MailboxResponse, PasswordResponse,
};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the provisioning service.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the service, e.g. `https://provisioning.example.net/api/v1`.
    pub base_url: Url,
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Domain under which mailboxes are created.
    pub domain: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Skip TLS certificate verification (test environments only).
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the domain is empty.
    pub fn new(
        base_url: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        let domain = domain.into();
        if domain.trim().is_empty() {
            return Err(Error::InvalidConfig("provisioning domain is empty".into()));
        }

        Ok(Self {
            base_url,
            username: username.into(),
            password: password.into(),
            domain,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        })
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables certificate verification.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Client for the mailbox provisioning REST API.
#[derive(Debug, Clone)]
pub struct ProvisioningApi {
    config: ApiConfig,
    http_client: Client,
}

impl ProvisioningApi {
    /// Creates a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The domain mailboxes are provisioned under.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Creates a mailbox `local_part@domain` for the user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with status 409 if the user already has a mailbox,
    /// or any other transport or API error.
    pub async fn create_mailbox(&self, user_id: &str, local_part: &str) -> Result<MailboxResponse> {
        let body = CreateMailboxRequest {
            local_part: local_part.to_string(),
            domain: self.config.domain.clone(),
        };

        debug!(user_id, local_part, "Creating remote mailbox");
        let response = self
            .request(Method::POST, user_id, &[])?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Fetches the user's mailbox. Passwords are never included.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    pub async fn get_mailbox(&self, user_id: &str) -> Result<Option<MailboxResponse>> {
        debug!(user_id, "Fetching remote mailbox");
        let response = self.request(Method::GET, user_id, &[])?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Deletes the user's mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "not found".
    pub async fn delete_mailbox(&self, user_id: &str) -> Result<DeleteOutcome> {
        debug!(user_id, "Deleting remote mailbox");
        let response = self.request(Method::DELETE, user_id, &[])?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(DeleteOutcome::Deleted)
    }

    /// Issues a new password for the user's mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox does not exist or the call fails.
    pub async fn reset_password(&self, user_id: &str) -> Result<String> {
        debug!(user_id, "Resetting remote mailbox password");
        let response = self
            .request(Method::POST, user_id, &["password"])?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: PasswordResponse = response.json().await?;
        Ok(body.password)
    }

    /// Builds an authenticated request for `{base}/users/{user_id}/mailbox/{extra..}`.
    fn request(&self, method: Method, user_id: &str, extra: &[&str]) -> Result<RequestBuilder> {
        let url = self.mailbox_url(user_id, extra)?;
        Ok(self
            .http_client
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password)))
    }

    fn mailbox_url(&self, user_id: &str, extra: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["users", user_id, "mailbox"])
            .extend(extra);
        Ok(url)
    }
}

/// Converts a non-success response into an API error, keeping the body as message.
async fn api_error(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body
    };
    Error::api(status.as_u16(), message)
}
