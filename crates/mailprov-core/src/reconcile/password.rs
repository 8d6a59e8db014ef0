//! Password reset for managed mailbox accounts.

use std::sync::Arc;

use tracing::info;

use super::address::domain_matches;
use super::orchestrator::encrypted_endpoint;
use crate::account::{AccountId, AccountStore, Endpoint, LocalAccount};
use crate::credentials::CredentialEncryptor;
use crate::fault::{FaultKind, ServiceFault};
use crate::provisioning::{ProvisioningClient, ServerConfig};

/// Issues a new remote password and stores it on the local record.
#[derive(Clone)]
pub struct PasswordReset {
    provisioning: Arc<dyn ProvisioningClient>,
    store: Arc<dyn AccountStore>,
    encryptor: Arc<dyn CredentialEncryptor>,
}

impl PasswordReset {
    /// Creates the operation over its collaborators.
    #[must_use]
    pub fn new(
        provisioning: Arc<dyn ProvisioningClient>,
        store: Arc<dyn AccountStore>,
        encryptor: Arc<dyn CredentialEncryptor>,
    ) -> Self {
        Self {
            provisioning,
            store,
            encryptor,
        }
    }

    /// Resets the password of one of the user's managed mailbox accounts.
    ///
    /// # Errors
    ///
    /// - not-found fault for an unknown account
    /// - validation fault for an account outside the provisioning domain
    /// - remote, storage or encryption faults from the collaborators
    pub async fn reset_password(
        &self,
        user_id: &str,
        account_id: AccountId,
    ) -> Result<LocalAccount, ServiceFault> {
        let mut account = self
            .store
            .find_by_id(user_id, account_id)
            .await?
            .ok_or_else(|| ServiceFault::not_found(format!("Account not found: {account_id}")))?;

        if !domain_matches(&account.email, self.provisioning.domain()) {
            return Err(ServiceFault::new(
                FaultKind::Validation,
                format!("{} is not a managed mailbox", account.email),
            ));
        }

        let password = self.provisioning.reset_password(user_id).await?;

        account.inbound = encrypted_endpoint(
            &server_with_password(&account.inbound, &password),
            self.encryptor.as_ref(),
        )?;
        account.outbound = encrypted_endpoint(
            &server_with_password(&account.outbound, &password),
            self.encryptor.as_ref(),
        )?;

        let account = self.store.update(account).await?;
        info!("Reset password for {}", account.email);
        Ok(account)
    }
}

fn server_with_password(endpoint: &Endpoint, password: &str) -> ServerConfig {
    ServerConfig::new(
        endpoint.host.clone(),
        endpoint.port,
        endpoint.security,
        endpoint.user.clone(),
    )
    .with_password(password)
}
