//! Conflict resolution against the provisioning service.

use std::sync::Arc;

use tracing::{debug, warn};

use super::address::{emails_match, expected_email};
use super::resolution::ConflictResolution;
use crate::fault::ServiceFault;
use crate::provisioning::ProvisioningClient;

/// Decides how a request relates to the user's existing remote mailbox.
#[derive(Clone)]
pub struct ConflictResolver {
    provisioning: Arc<dyn ProvisioningClient>,
}

impl ConflictResolver {
    /// Creates a resolver over a provisioning client.
    #[must_use]
    pub fn new(provisioning: Arc<dyn ProvisioningClient>) -> Self {
        Self { provisioning }
    }

    /// Looks up the user's remote mailbox and compares it with
    /// `local_part@domain`.
    ///
    /// # Errors
    ///
    /// Returns a remote fault if the lookup fails. A failed lookup is never
    /// reported as [`ConflictResolution::NoExistingAccount`].
    pub async fn resolve(
        &self,
        user_id: &str,
        local_part: &str,
    ) -> Result<ConflictResolution, ServiceFault> {
        let expected = expected_email(local_part, self.provisioning.domain());

        let Some(config) = self.provisioning.get(user_id).await? else {
            debug!("No remote mailbox for user {user_id}");
            return Ok(ConflictResolution::NoExistingAccount);
        };

        if emails_match(&config.email, &expected) {
            debug!("Remote mailbox {} matches request", config.email);
            Ok(ConflictResolution::Retry { config })
        } else {
            warn!(
                "Remote mailbox {} for user {user_id} does not match {expected}",
                config.email
            );
            Ok(ConflictResolution::EmailMismatch {
                expected,
                existing: config.email,
            })
        }
    }
}
