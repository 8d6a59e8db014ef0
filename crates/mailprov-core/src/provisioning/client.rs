//! Provisioning client abstraction.

use async_trait::async_trait;

use super::model::MailboxConfig;

/// Failure reported by the provisioning service or the transport to it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteFault {
    /// HTTP-like status code, when the service answered.
    pub code: Option<u16>,
    /// Error description.
    pub message: String,
}

impl RemoteFault {
    /// Creates a remote fault.
    #[must_use]
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Whether the service reported that a mailbox already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.code == Some(409)
    }

    /// Status to surface to callers: the remote code when it is a client or
    /// server error, 400 otherwise.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.code
            .filter(|code| (400..=599).contains(code))
            .unwrap_or(400)
    }
}

/// Remote mailbox provisioning operations.
///
/// Each user has at most one remote mailbox.
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Domain new mailboxes are created under.
    fn domain(&self) -> &str;

    /// Creates the user's mailbox; the returned config carries passwords.
    async fn create(&self, user_id: &str, local_part: &str) -> Result<MailboxConfig, RemoteFault>;

    /// Fetches the user's mailbox, without passwords.
    async fn get(&self, user_id: &str) -> Result<Option<MailboxConfig>, RemoteFault>;

    /// Deletes the user's mailbox. A missing mailbox counts as deleted.
    async fn delete(&self, user_id: &str) -> Result<bool, RemoteFault>;

    /// Issues a new password for the user's mailbox.
    async fn reset_password(&self, user_id: &str) -> Result<String, RemoteFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keeps_error_codes() {
        assert_eq!(RemoteFault::new(Some(409), "exists").status(), 409);
        assert_eq!(RemoteFault::new(Some(503), "down").status(), 503);
        assert_eq!(RemoteFault::new(Some(400), "bad").status(), 400);
        assert_eq!(RemoteFault::new(Some(599), "odd").status(), 599);
    }

    #[test]
    fn status_falls_back_to_400() {
        assert_eq!(RemoteFault::new(None, "timeout").status(), 400);
        assert_eq!(RemoteFault::new(Some(302), "moved").status(), 400);
        assert_eq!(RemoteFault::new(Some(600), "weird").status(), 400);
    }

    #[test]
    fn conflict_detection() {
        assert!(RemoteFault::new(Some(409), "exists").is_conflict());
        assert!(!RemoteFault::new(Some(500), "boom").is_conflict());
        assert!(!RemoteFault::new(None, "boom").is_conflict());
    }
}
