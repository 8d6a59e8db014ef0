//! Account creation and repair.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::address::expected_email;
use super::resolution::ConflictResolution;
use super::resolver::ConflictResolver;
use crate::account::{AccountStore, AuthMethod, Endpoint, LocalAccount, validate_account_request};
use crate::credentials::CredentialEncryptor;
use crate::fault::ServiceFault;
use crate::provisioning::{MailboxConfig, ProvisioningClient, ServerConfig};

/// Builds a stored endpoint, encrypting the server's password.
///
/// Every call encrypts on its own; two endpoints never share a ciphertext.
pub(super) fn encrypted_endpoint(
    server: &ServerConfig,
    encryptor: &dyn CredentialEncryptor,
) -> Result<Endpoint, ServiceFault> {
    let password = server.password.as_deref().unwrap_or_default();
    Ok(Endpoint {
        host: server.host.clone(),
        port: server.port,
        security: server.security,
        user: server.username.clone(),
        encrypted_password: encryptor.encrypt(password)?,
    })
}

/// Creates managed mailbox accounts, repairing local records that point at
/// mailboxes the provisioning service already holds.
///
/// The local store is read before any remote call, and every remote call
/// completes before the local store is written. Two concurrent requests for
/// the same user are not serialized.
#[derive(Clone)]
pub struct AccountCreationOrchestrator {
    provisioning: Arc<dyn ProvisioningClient>,
    store: Arc<dyn AccountStore>,
    encryptor: Arc<dyn CredentialEncryptor>,
    resolver: ConflictResolver,
}

impl AccountCreationOrchestrator {
    /// Creates an orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        provisioning: Arc<dyn ProvisioningClient>,
        store: Arc<dyn AccountStore>,
        encryptor: Arc<dyn CredentialEncryptor>,
    ) -> Self {
        Self {
            resolver: ConflictResolver::new(Arc::clone(&provisioning)),
            provisioning,
            store,
            encryptor,
        }
    }

    /// The resolver used for conflict handling.
    #[must_use]
    pub const fn resolver(&self) -> &ConflictResolver {
        &self.resolver
    }

    /// Creates the user's managed mailbox account, or repairs the existing
    /// local record for it.
    ///
    /// # Errors
    ///
    /// - validation fault for malformed input, before any other call
    /// - conflict fault when the user's remote mailbox has another address
    /// - inconsistency fault when a local record exists without a remote mailbox
    /// - remote, storage or encryption faults from the collaborators
    pub async fn create_or_update_account(
        &self,
        user_id: &str,
        local_part: &str,
        display_name: &str,
    ) -> Result<LocalAccount, ServiceFault> {
        validate_account_request(user_id, local_part, display_name)
            .map_err(|errors| ServiceFault::validation(&errors))?;

        let expected = expected_email(local_part, self.provisioning.domain());
        debug!("Looking up local account {expected} for user {user_id}");

        match self
            .store
            .find_by_user_and_address(user_id, &expected)
            .await?
        {
            Some(account) => self.repair(account, local_part, display_name).await,
            None => self.provision(user_id, local_part, display_name).await,
        }
    }

    /// A local record exists; reconcile it with the remote mailbox.
    async fn repair(
        &self,
        account: LocalAccount,
        local_part: &str,
        display_name: &str,
    ) -> Result<LocalAccount, ServiceFault> {
        match self.resolver.resolve(&account.user_id, local_part).await? {
            ConflictResolution::Retry { config } => {
                info!("Repairing local account {}", account.email);
                self.persist(account, &config, display_name).await
            }
            ConflictResolution::EmailMismatch { expected, existing } => {
                Err(ServiceFault::email_mismatch(&expected, &existing))
            }
            ConflictResolution::NoExistingAccount => {
                warn!(
                    "Local account {} exists but the user has no remote mailbox",
                    account.email
                );
                Err(ServiceFault::inconsistency(format!(
                    "Local account {} has no remote mailbox",
                    account.email
                )))
            }
        }
    }

    /// No local record; provision remotely, falling back to conflict
    /// resolution when creation fails.
    async fn provision(
        &self,
        user_id: &str,
        local_part: &str,
        display_name: &str,
    ) -> Result<LocalAccount, ServiceFault> {
        let original = match self.provisioning.create(user_id, local_part).await {
            Ok(config) => {
                info!("Provisioned mailbox {} for user {user_id}", config.email);
                let account = LocalAccount::new(user_id, &config.email);
                return self.persist(account, &config, display_name).await;
            }
            Err(fault) => ServiceFault::from(fault),
        };

        warn!(
            "Provisioning for user {user_id} failed ({}), checking for an existing mailbox",
            original.message
        );

        let resolution = match self.resolver.resolve(user_id, local_part).await {
            Ok(resolution) => resolution,
            Err(fault) => return Err(fault.with_cause(original)),
        };

        match resolution {
            ConflictResolution::Retry { config } => {
                info!("Adopting existing mailbox {} for user {user_id}", config.email);
                let account = LocalAccount::new(user_id, &config.email);
                self.persist(account, &config, display_name).await
            }
            ConflictResolution::EmailMismatch { expected, existing } => {
                Err(ServiceFault::email_mismatch(&expected, &existing).with_cause(original))
            }
            ConflictResolution::NoExistingAccount => Err(original),
        }
    }

    /// Writes server-issued credentials into the local record and stores it.
    async fn persist(
        &self,
        mut account: LocalAccount,
        config: &MailboxConfig,
        display_name: &str,
    ) -> Result<LocalAccount, ServiceFault> {
        let issued;
        let config = if config.has_credentials() {
            config
        } else {
            debug!("Mailbox {} has no password, requesting a new one", config.email);
            let password = self.provisioning.reset_password(&account.user_id).await?;
            issued = config.with_password(&password);
            &issued
        };

        account.display_name = display_name.trim().to_string();
        account.auth_method = AuthMethod::Password;
        account.inbound = encrypted_endpoint(&config.imap, self.encryptor.as_ref())?;
        account.outbound = encrypted_endpoint(&config.smtp, self.encryptor.as_ref())?;

        if account.is_saved() {
            let account = self.store.update(account).await?;
            info!("Updated local account {}", account.email);
            Ok(account)
        } else {
            let account = self.store.save(account).await?;
            info!("Saved local account {}", account.email);
            Ok(account)
        }
    }
}
