//! Outcome of comparing a requested mailbox with the remote state.

use serde::Serialize;

use crate::provisioning::MailboxConfig;

/// What the provisioning service already holds for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum ConflictResolution {
    /// A remote mailbox with the requested address exists and can be reused.
    Retry {
        /// Configuration of the existing mailbox (no password).
        config: MailboxConfig,
    },
    /// The user has no remote mailbox.
    NoExistingAccount,
    /// The user's remote mailbox has a different address.
    EmailMismatch {
        /// Address the request asked for.
        expected: String,
        /// Address the remote mailbox has.
        existing: String,
    },
}

impl ConflictResolution {
    /// Whether the existing remote mailbox can be adopted.
    #[must_use]
    pub const fn can_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }

    /// Whether the remote mailbox belongs to another address.
    #[must_use]
    pub const fn has_email_mismatch(&self) -> bool {
        matches!(self, Self::EmailMismatch { .. })
    }

    /// Configuration to adopt, for [`ConflictResolution::Retry`].
    #[must_use]
    pub const fn config(&self) -> Option<&MailboxConfig> {
        match self {
            Self::Retry { config } => Some(config),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::account::Security;
    use crate::provisioning::ServerConfig;

    fn config() -> MailboxConfig {
        MailboxConfig {
            email: "john@example.com".into(),
            imap: ServerConfig::new("imap.example.com", 993, Security::Tls, "john"),
            smtp: ServerConfig::new("smtp.example.com", 465, Security::Ssl, "john"),
        }
    }

    #[test]
    fn retry_flags() {
        let resolution = ConflictResolution::Retry { config: config() };
        assert!(resolution.can_retry());
        assert!(!resolution.has_email_mismatch());
        assert_eq!(resolution.config(), Some(&config()));
    }

    #[test]
    fn mismatch_flags() {
        let resolution = ConflictResolution::EmailMismatch {
            expected: "john@example.com".into(),
            existing: "jane@example.com".into(),
        };
        assert!(!resolution.can_retry());
        assert!(resolution.has_email_mismatch());
        assert_eq!(resolution.config(), None);
    }

    #[test]
    fn no_existing_account_is_neither() {
        let resolution = ConflictResolution::NoExistingAccount;
        assert!(!resolution.can_retry());
        assert!(!resolution.has_email_mismatch());
        assert_eq!(resolution.config(), None);
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(ConflictResolution::NoExistingAccount).unwrap();
        assert_eq!(json["resolution"], "no_existing_account");

        let json = serde_json::to_value(ConflictResolution::Retry { config: config() }).unwrap();
        assert_eq!(json["resolution"], "retry");
        assert_eq!(json["config"]["email"], "john@example.com");
    }
}
