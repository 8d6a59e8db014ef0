//! Remote cleanup when a local account is deleted.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::address::{domain_matches, emails_match};
use crate::account::{AccountId, AccountStore, LocalAccount};
use crate::fault::{ServiceFault, sanitize_message};
use crate::provisioning::ProvisioningClient;

/// What happened to the remote mailbox during an account deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// The remote mailbox was deleted.
    Deleted,
    /// The account is not in the provisioning domain; nothing to do remotely.
    ForeignDomain,
    /// The user has no remote mailbox.
    NoRemoteMailbox,
    /// The user's remote mailbox has a different address and was left alone.
    AddressMismatch,
    /// A remote call failed; the failure was logged.
    Failed,
}

/// Deletes local accounts, removing the matching remote mailbox when it is
/// safe to do so.
#[derive(Clone)]
pub struct DeletionReconciler {
    provisioning: Arc<dyn ProvisioningClient>,
    store: Arc<dyn AccountStore>,
}

impl DeletionReconciler {
    /// Creates a reconciler over its collaborators.
    #[must_use]
    pub fn new(provisioning: Arc<dyn ProvisioningClient>, store: Arc<dyn AccountStore>) -> Self {
        Self {
            provisioning,
            store,
        }
    }

    /// Deletes the user's remote mailbox if, and only if, it is the mailbox
    /// the local account points at.
    ///
    /// Never fails: remote errors are logged and reported as
    /// [`DeletionOutcome::Failed`].
    pub async fn reconcile_remote_deletion(
        &self,
        user_id: &str,
        account: &LocalAccount,
    ) -> DeletionOutcome {
        if !domain_matches(&account.email, self.provisioning.domain()) {
            debug!("{} is not a managed mailbox, skipping remote deletion", account.email);
            return DeletionOutcome::ForeignDomain;
        }

        let remote = match self.provisioning.get(user_id).await {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                debug!("No remote mailbox for user {user_id}");
                return DeletionOutcome::NoRemoteMailbox;
            }
            Err(fault) => {
                warn!(
                    "Remote mailbox lookup for user {user_id} failed: {}",
                    sanitize_message(&fault.message)
                );
                return DeletionOutcome::Failed;
            }
        };

        if !emails_match(&remote.email, &account.email) {
            warn!(
                "Remote mailbox {} does not match {}, leaving it in place",
                remote.email, account.email
            );
            return DeletionOutcome::AddressMismatch;
        }

        match self.provisioning.delete(user_id).await {
            Ok(true) => {
                info!("Deleted remote mailbox {}", remote.email);
                DeletionOutcome::Deleted
            }
            Ok(false) => {
                warn!("Provisioning service did not delete {}", remote.email);
                DeletionOutcome::Failed
            }
            Err(fault) => {
                warn!(
                    "Deleting remote mailbox {} failed: {}",
                    remote.email,
                    sanitize_message(&fault.message)
                );
                DeletionOutcome::Failed
            }
        }
    }

    /// Deletes one of the user's local accounts, cleaning up its remote
    /// mailbox first. The local record is deleted whatever the remote outcome.
    ///
    /// # Errors
    ///
    /// Returns a not-found fault for an unknown account, or a storage fault.
    pub async fn delete_account(
        &self,
        user_id: &str,
        account_id: AccountId,
    ) -> Result<DeletionOutcome, ServiceFault> {
        let account = self
            .store
            .find_by_id(user_id, account_id)
            .await?
            .ok_or_else(|| ServiceFault::not_found(format!("Account not found: {account_id}")))?;

        let outcome = self.reconcile_remote_deletion(user_id, &account).await;

        self.store.delete(user_id, account_id).await?;
        info!("Deleted local account {} ({outcome:?})", account.email);

        Ok(outcome)
    }
}
