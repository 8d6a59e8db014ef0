//! User-facing faults of the reconciliation engine.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;

use crate::account::ValidationError;
use crate::credentials::CredentialError;
use crate::provisioning::RemoteFault;

/// Matches the scheme and authority of a URL.
#[allow(clippy::expect_used)]
static URL_AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b([a-z][a-z0-9+.\-]*://)[^/\s?#)\],;>"]+"#)
        .expect("URL_AUTHORITY is a valid regex")
});

/// Placeholder substituted for server addresses in messages.
pub const SERVER_PLACEHOLDER: &str = "[SERVER]";

/// Replaces the host (and port or userinfo) of every URL in a message with
/// `[SERVER]`, keeping the scheme and path.
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    URL_AUTHORITY
        .replace_all(message, format!("${{1}}{SERVER_PLACEHOLDER}").as_str())
        .into_owned()
}

/// Machine-readable fault category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Request input was rejected before any remote call.
    Validation,
    /// The provisioning service failed.
    Remote,
    /// Local and remote state disagree about the user's mailbox address.
    Conflict,
    /// Local and remote state are inconsistent in a way that cannot be repaired.
    Inconsistency,
    /// The account store failed.
    Storage,
    /// Credential encryption failed.
    Encryption,
    /// A referenced account or provider does not exist.
    NotFound,
}

impl FaultKind {
    /// Default HTTP-like status for the kind.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::Validation | Self::Remote => 400,
            Self::Conflict => 409,
            Self::NotFound => 404,
            Self::Inconsistency | Self::Storage | Self::Encryption => 500,
        }
    }
}

/// Structured failure returned by every engine operation.
///
/// The message is always sanitized. A fault may chain the failure that
/// caused it.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[error("{message}")]
pub struct ServiceFault {
    /// Fault category.
    pub kind: FaultKind,
    /// HTTP-like status code.
    pub status: u16,
    /// Sanitized human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure this fault was raised for.
    #[source]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ServiceFault>>,
}

impl ServiceFault {
    /// Creates a fault with the kind's default status.
    #[must_use]
    pub fn new(kind: FaultKind, message: impl AsRef<str>) -> Self {
        Self {
            kind,
            status: kind.default_status(),
            message: sanitize_message(message.as_ref()),
            data: None,
            cause: None,
        }
    }

    /// Validation fault listing the offending fields.
    #[must_use]
    pub fn validation(errors: &[ValidationError]) -> Self {
        let message = errors
            .iter()
            .map(ValidationError::message)
            .collect::<Vec<_>>()
            .join("; ");
        let fields: Vec<_> = errors
            .iter()
            .map(|e| json!({ "field": e.field(), "message": e.message() }))
            .collect();

        Self::new(FaultKind::Validation, message).with_data(json!({ "errors": fields }))
    }

    /// Conflict fault for a user whose remote mailbox has another address.
    #[must_use]
    pub fn email_mismatch(expected: &str, existing: &str) -> Self {
        Self::new(
            FaultKind::Conflict,
            format!(
                "A mailbox already exists for this user under {existing}, not {expected}"
            ),
        )
        .with_data(json!({
            "expected_email": expected,
            "existing_email": existing,
        }))
    }

    /// Fault for state that cannot be reconciled.
    #[must_use]
    pub fn inconsistency(message: impl AsRef<str>) -> Self {
        Self::new(FaultKind::Inconsistency, message)
    }

    /// Fault for a missing account or provider.
    #[must_use]
    pub fn not_found(message: impl AsRef<str>) -> Self {
        Self::new(FaultKind::NotFound, message)
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Chains the fault this one was raised for.
    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Whether the fault is the caller's to fix (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }
}

impl From<RemoteFault> for ServiceFault {
    fn from(fault: RemoteFault) -> Self {
        Self {
            status: fault.status(),
            ..Self::new(FaultKind::Remote, &fault.message)
        }
    }
}

impl From<CredentialError> for ServiceFault {
    fn from(err: CredentialError) -> Self {
        Self::new(FaultKind::Encryption, err.to_string())
    }
}

impl From<crate::Error> for ServiceFault {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::Credential(e) => e.into(),
            crate::Error::AccountNotFound(id) => Self::not_found(format!("Account not found: {id}")),
            other => Self::new(FaultKind::Storage, other.to_string()),
        }
    }
}
