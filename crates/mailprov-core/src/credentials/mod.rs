//! Credential protection.
//!
//! Mailbox passwords never reach the account store in plaintext. They go
//! through a [`CredentialEncryptor`] first, whose master key lives in the
//! system keyring.

mod encryptor;
pub mod keychain;

pub use encryptor::{AesGcmEncryptor, CredentialEncryptor, generate_key};

/// Credential error type.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Keyring access failed.
    #[error("Keyring error: {0}")]
    Keyring(#[from] ::keyring::Error),

    /// Master key is malformed.
    #[error("Invalid master key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// A keyring entry was requested without a scope.
    #[error("Credential scope must not be empty")]
    MissingScope,
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;
