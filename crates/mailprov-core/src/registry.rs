//! Registry of managed mailbox providers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::account::{AccountId, AccountStore, LocalAccount, ValidationError, validate_local_part};
use crate::credentials::CredentialEncryptor;
use crate::fault::ServiceFault;
use crate::provisioning::ProvisioningClient;
use crate::reconcile::{
    AccountCreationOrchestrator, ConflictResolution, DeletionOutcome, DeletionReconciler,
    PasswordReset,
};

/// Provider id used when none is given.
pub const DEFAULT_PROVIDER: &str = "managed";

/// Every managed-mailbox operation over one set of collaborators.
pub struct ManagedMailboxProvider {
    id: String,
    domain: String,
    orchestrator: AccountCreationOrchestrator,
    deletion: DeletionReconciler,
    password_reset: PasswordReset,
}

impl ManagedMailboxProvider {
    /// Wires a provider from its collaborators.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        provisioning: Arc<dyn ProvisioningClient>,
        store: Arc<dyn AccountStore>,
        encryptor: Arc<dyn CredentialEncryptor>,
    ) -> Self {
        Self {
            id: id.into(),
            domain: provisioning.domain().to_string(),
            orchestrator: AccountCreationOrchestrator::new(
                Arc::clone(&provisioning),
                Arc::clone(&store),
                Arc::clone(&encryptor),
            ),
            deletion: DeletionReconciler::new(Arc::clone(&provisioning), Arc::clone(&store)),
            password_reset: PasswordReset::new(provisioning, store, encryptor),
        }
    }

    /// Provider id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provisioning domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// See [`AccountCreationOrchestrator::create_or_update_account`].
    ///
    /// # Errors
    ///
    /// Returns the orchestrator's fault.
    pub async fn create_or_update_account(
        &self,
        user_id: &str,
        local_part: &str,
        display_name: &str,
    ) -> Result<LocalAccount, ServiceFault> {
        self.orchestrator
            .create_or_update_account(user_id, local_part, display_name)
            .await
    }

    /// See [`crate::reconcile::ConflictResolver::resolve`].
    ///
    /// # Errors
    ///
    /// Returns a validation fault for an empty user id or a malformed local
    /// part, before any remote call, or a remote fault if the lookup fails.
    pub async fn resolve(
        &self,
        user_id: &str,
        local_part: &str,
    ) -> Result<ConflictResolution, ServiceFault> {
        let mut errors = Vec::new();
        if user_id.trim().is_empty() {
            errors.push(ValidationError::EmptyUserId);
        }
        if let Err(e) = validate_local_part(local_part) {
            errors.push(e);
        }
        if !errors.is_empty() {
            return Err(ServiceFault::validation(&errors));
        }

        self.orchestrator.resolver().resolve(user_id, local_part).await
    }

    /// See [`DeletionReconciler::delete_account`].
    ///
    /// # Errors
    ///
    /// Returns a not-found or storage fault.
    pub async fn delete_account(
        &self,
        user_id: &str,
        account_id: AccountId,
    ) -> Result<DeletionOutcome, ServiceFault> {
        self.deletion.delete_account(user_id, account_id).await
    }

    /// See [`PasswordReset::reset_password`].
    ///
    /// # Errors
    ///
    /// Returns the reset's fault.
    pub async fn reset_password(
        &self,
        user_id: &str,
        account_id: AccountId,
    ) -> Result<LocalAccount, ServiceFault> {
        self.password_reset.reset_password(user_id, account_id).await
    }
}

/// Providers by id, built once at startup and passed to whoever needs them.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<ManagedMailboxProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider, replacing any provider with the same id.
    #[must_use]
    pub fn with_provider(mut self, provider: ManagedMailboxProvider) -> Self {
        self.providers
            .insert(provider.id().to_string(), Arc::new(provider));
        self
    }

    /// Looks up a provider by id.
    ///
    /// # Errors
    ///
    /// Returns a not-found fault for an unknown id.
    pub fn get(&self, id: &str) -> Result<Arc<ManagedMailboxProvider>, ServiceFault> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceFault::not_found(format!("Unknown mailbox provider: {id}")))
    }

    /// Registered provider ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
