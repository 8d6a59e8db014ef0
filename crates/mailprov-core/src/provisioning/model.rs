//! Mailbox configuration as issued by the provisioning service.

use serde::Serialize;

use crate::account::Security;

/// Connection settings for one protocol of a provisioned mailbox.
///
/// Values are immutable; use [`ServerConfig::with_password`] to derive a copy
/// carrying a different password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Normalized security mode.
    pub security: Security,
    /// Login name.
    pub username: String,
    /// Plaintext password, present only when freshly issued.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl ServerConfig {
    /// Creates a server config without a password.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        security: Security,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            security,
            username: username.into(),
            password: None,
        }
    }

    /// Returns a copy with every field kept except the password.
    #[must_use]
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..self.clone()
        }
    }
}

/// A provisioned mailbox: its address plus IMAP and SMTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailboxConfig {
    /// Mailbox address.
    pub email: String,
    /// Incoming server.
    pub imap: ServerConfig,
    /// Outgoing server.
    pub smtp: ServerConfig,
}

impl MailboxConfig {
    /// Whether both servers carry a password.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.imap.password.is_some() && self.smtp.password.is_some()
    }

    /// Returns a copy with the same password applied to both servers.
    #[must_use]
    pub fn with_password(&self, password: &str) -> Self {
        Self {
            email: self.email.clone(),
            imap: self.imap.with_password(password),
            smtp: self.smtp.with_password(password),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn imap() -> ServerConfig {
        ServerConfig::new("imap.example.com", 993, Security::Tls, "john@example.com")
    }

    #[test]
    fn with_password_keeps_other_fields() {
        let original = imap();
        let updated = original.with_password("s3cret");

        assert_eq!(updated.host, original.host);
        assert_eq!(updated.port, 993);
        assert_eq!(updated.security, Security::Tls);
        assert_eq!(updated.username, original.username);
        assert_eq!(updated.password.as_deref(), Some("s3cret"));
        assert_eq!(original.password, None);
    }

    #[test]
    fn mailbox_credentials() {
        let config = MailboxConfig {
            email: "john@example.com".into(),
            imap: imap(),
            smtp: ServerConfig::new("smtp.example.com", 587, Security::Tls, "john@example.com"),
        };
        assert!(!config.has_credentials());
        assert!(config.with_password("pw").has_credentials());
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_value(imap().with_password("s3cret")).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["security"], "tls");
    }
}
