//! Local account model types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a local account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption.
    #[default]
    None,
    /// TLS, either implicit or negotiated with STARTTLS.
    Tls,
    /// Legacy SSL.
    Ssl,
}

impl Security {
    /// Normalizes a security mode reported by the provisioning service.
    ///
    /// Matching is a case-insensitive substring test: anything mentioning
    /// `starttls` or `tls` is [`Security::Tls`], anything mentioning `ssl` is
    /// [`Security::Ssl`], everything else is [`Security::None`].
    #[must_use]
    pub fn from_remote(mode: &str) -> Self {
        let mode = mode.to_lowercase();
        if mode.contains("starttls") || mode.contains("tls") {
            Self::Tls
        } else if mode.contains("ssl") {
            Self::Ssl
        } else {
            Self::None
        }
    }

    /// Stored/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tls => "tls",
            Self::Ssl => "ssl",
        }
    }
}

impl std::fmt::Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the mail client authenticates against the servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Username and password.
    #[default]
    Password,
    /// `OAuth2` bearer token.
    OAuth2,
}

impl AuthMethod {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::OAuth2 => "oauth2",
        }
    }

    /// Parses the stored representation, defaulting to password auth.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "oauth2" => Self::OAuth2,
            _ => Self::Password,
        }
    }
}

/// Connection settings for one direction (inbound or outbound) of an account.
///
/// The password is only ever held encrypted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Login name.
    pub user: String,
    /// Password as returned by the credential encryptor.
    #[serde(skip_serializing, default)]
    pub encrypted_password: String,
}

/// The host application's mailbox account record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    /// Unique identifier (None for unsaved accounts).
    pub id: Option<AccountId>,
    /// Owning user.
    pub user_id: String,
    /// Name shown to the user.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Authentication method.
    pub auth_method: AuthMethod,
    /// Incoming (IMAP) server.
    pub inbound: Endpoint,
    /// Outgoing (SMTP) server.
    pub outbound: Endpoint,
}

impl LocalAccount {
    /// Create a new, unsaved account for a user and address.
    #[must_use]
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    /// Whether the record has been persisted.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod account_id_tests {
        use super::*;

        #[test]
        fn display() {
            let id = AccountId::new(123);
            assert_eq!(format!("{id}"), "123");
        }

        #[test]
        fn equality() {
            assert_eq!(AccountId::new(1), AccountId::new(1));
            assert_ne!(AccountId::new(1), AccountId::new(2));
        }
    }

    mod security_tests {
        use super::*;

        #[test]
        fn tls_variants() {
            assert_eq!(Security::from_remote("TLS"), Security::Tls);
            assert_eq!(Security::from_remote("starttls"), Security::Tls);
            assert_eq!(Security::from_remote("STARTTLS"), Security::Tls);
            assert_eq!(Security::from_remote("SSL/TLS"), Security::Tls);
        }

        #[test]
        fn ssl() {
            assert_eq!(Security::from_remote("SSL"), Security::Ssl);
            assert_eq!(Security::from_remote("ssl-implicit"), Security::Ssl);
        }

        #[test]
        fn anything_else_is_none() {
            assert_eq!(Security::from_remote(""), Security::None);
            assert_eq!(Security::from_remote("plain"), Security::None);
            assert_eq!(Security::from_remote("none"), Security::None);
        }

        #[test]
        fn serde_is_lowercase() {
            assert_eq!(serde_json::to_string(&Security::Tls).unwrap(), "\"tls\"");
            assert_eq!(Security::Ssl.to_string(), "ssl");
        }

        proptest::proptest! {
            #[test]
            fn any_mode_mentioning_tls_is_tls(
                prefix in "[a-zA-Z/_-]{0,8}",
                suffix in "[a-zA-Z/_-]{0,8}",
                upper in proptest::bool::ANY,
            ) {
                let tls = if upper { "TLS" } else { "tls" };
                let mode = format!("{prefix}{tls}{suffix}");
                proptest::prop_assert_eq!(Security::from_remote(&mode), Security::Tls);
            }

            #[test]
            fn modes_without_an_s_are_none(mode in "[a-rt-zA-RT-Z0-9 _-]{0,16}") {
                proptest::prop_assert_eq!(Security::from_remote(&mode), Security::None);
            }
        }
    }

    mod auth_method_tests {
        use super::*;

        #[test]
        fn round_trips_stored_form() {
            assert_eq!(AuthMethod::parse(AuthMethod::OAuth2.as_str()), AuthMethod::OAuth2);
            assert_eq!(AuthMethod::parse("password"), AuthMethod::Password);
            assert_eq!(AuthMethod::parse("unknown"), AuthMethod::Password);
        }
    }

    mod local_account_tests {
        use super::*;

        #[test]
        fn new_is_unsaved() {
            let account = LocalAccount::new("alice", "alice@example.com");
            assert!(!account.is_saved());
            assert_eq!(account.user_id, "alice");
            assert_eq!(account.auth_method, AuthMethod::Password);
        }

        #[test]
        fn serialization_hides_encrypted_passwords() {
            let mut account = LocalAccount::new("alice", "alice@example.com");
            account.inbound.encrypted_password = "ciphertext".to_string();
            let json = serde_json::to_string(&account).unwrap();
            assert!(!json.contains("ciphertext"));
        }
    }
}
