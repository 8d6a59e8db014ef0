//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in storage and infrastructure operations.
///
/// User-facing failures of the reconciliation engine are reported as
/// [`crate::ServiceFault`]; this type covers the adapters underneath it.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Credential storage or encryption error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::credentials::CredentialError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
