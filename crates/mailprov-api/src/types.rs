//! Wire types exchanged with the provisioning service.

use serde::{Deserialize, Serialize};

/// Body of a mailbox creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMailboxRequest {
    /// Requested local part (before the `@`).
    pub local_part: String,
    /// Domain the mailbox is created under.
    pub domain: String,
}

/// Connection settings for one protocol endpoint of a mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Transport security as reported by the service (free-form, e.g. `"TLS"`).
    #[serde(default)]
    pub ssl_mode: String,
    /// Login name.
    pub username: String,
    /// Password; only present when the service has just issued it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A provisioned mailbox as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxResponse {
    /// Full email address of the mailbox.
    pub email: String,
    /// Incoming mail server.
    pub imap: ServerResponse,
    /// Outgoing mail server.
    pub smtp: ServerResponse,
}

/// Response to a password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResponse {
    /// The newly issued password.
    pub password: String,
}

/// Outcome of a delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The mailbox existed and was removed.
    Deleted,
    /// There was no mailbox to remove.
    NotFound,
}
