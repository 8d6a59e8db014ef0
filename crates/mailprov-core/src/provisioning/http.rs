//! [`ProvisioningClient`] backed by the provisioning REST API.

use async_trait::async_trait;
use mailprov_api::{DeleteOutcome, MailboxResponse, ProvisioningApi, ServerResponse};
use tracing::debug;

use super::client::{ProvisioningClient, RemoteFault};
use super::model::{MailboxConfig, ServerConfig};
use crate::account::{Security, is_valid_email};

/// Status reported when the service answers with an unusable mailbox.
const BAD_GATEWAY: u16 = 502;

/// HTTP provisioning client.
pub struct HttpProvisioningClient {
    api: ProvisioningApi,
}

impl HttpProvisioningClient {
    /// Wraps a configured API client.
    #[must_use]
    pub const fn new(api: ProvisioningApi) -> Self {
        Self { api }
    }
}

impl From<mailprov_api::Error> for RemoteFault {
    fn from(err: mailprov_api::Error) -> Self {
        match err {
            mailprov_api::Error::Api { status, message } => Self::new(Some(status), message),
            other => Self::new(other.status(), other.to_string()),
        }
    }
}

fn server_config(server: ServerResponse) -> ServerConfig {
    ServerConfig {
        host: server.host,
        port: server.port,
        security: Security::from_remote(&server.ssl_mode),
        username: server.username,
        password: server.password,
    }
}

fn mailbox_config(mailbox: MailboxResponse) -> Result<MailboxConfig, RemoteFault> {
    if !is_valid_email(&mailbox.email) {
        return Err(RemoteFault::new(
            Some(BAD_GATEWAY),
            format!(
                "Provisioning service returned an invalid address: {}",
                mailbox.email
            ),
        ));
    }

    Ok(MailboxConfig {
        email: mailbox.email.trim().to_string(),
        imap: server_config(mailbox.imap),
        smtp: server_config(mailbox.smtp),
    })
}

#[async_trait]
impl ProvisioningClient for HttpProvisioningClient {
    fn domain(&self) -> &str {
        self.api.domain()
    }

    async fn create(&self, user_id: &str, local_part: &str) -> Result<MailboxConfig, RemoteFault> {
        debug!("Provisioning mailbox {local_part} for user {user_id}");
        let mailbox = self.api.create_mailbox(user_id, local_part).await?;
        mailbox_config(mailbox)
    }

    async fn get(&self, user_id: &str) -> Result<Option<MailboxConfig>, RemoteFault> {
        debug!("Looking up mailbox for user {user_id}");
        self.api
            .get_mailbox(user_id)
            .await?
            .map(mailbox_config)
            .transpose()
    }

    async fn delete(&self, user_id: &str) -> Result<bool, RemoteFault> {
        debug!("Deleting mailbox for user {user_id}");
        match self.api.delete_mailbox(user_id).await? {
            DeleteOutcome::Deleted => Ok(true),
            DeleteOutcome::NotFound => {
                debug!("No mailbox to delete for user {user_id}");
                Ok(true)
            }
        }
    }

    async fn reset_password(&self, user_id: &str) -> Result<String, RemoteFault> {
        debug!("Resetting mailbox password for user {user_id}");
        Ok(self.api.reset_password(user_id).await?)
    }
}
