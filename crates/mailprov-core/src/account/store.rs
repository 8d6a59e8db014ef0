//! Account store abstraction.

use async_trait::async_trait;

use super::model::{AccountId, LocalAccount};
use crate::Result;

/// Persistence for local account records.
///
/// Implementations must treat "nothing found" as `Ok(None)`, never as an error.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find the user's account for an email address (case-insensitive).
    async fn find_by_user_and_address(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<LocalAccount>>;

    /// Find one of the user's accounts by ID.
    async fn find_by_id(&self, user_id: &str, id: AccountId) -> Result<Option<LocalAccount>>;

    /// Insert a new account and return it with its assigned ID.
    async fn save(&self, account: LocalAccount) -> Result<LocalAccount>;

    /// Overwrite an existing account.
    async fn update(&self, account: LocalAccount) -> Result<LocalAccount>;

    /// Delete one of the user's accounts.
    async fn delete(&self, user_id: &str, id: AccountId) -> Result<()>;
}
