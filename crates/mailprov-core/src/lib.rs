//! # mailprov-core
//!
//! Reconciliation engine for managed mailbox accounts.
//!
//! A managed mailbox exists twice: as a local account record and as a
//! mailbox on a remote provisioning service. This crate keeps the two in
//! step:
//! - **Account creation** - provision a mailbox, or adopt one a previous
//!   attempt already created, and store its credentials encrypted
//! - **Conflict resolution** - detect when the user's remote mailbox has a
//!   different address and refuse to paper over it
//! - **Deletion** - remove the remote mailbox only when it is the one the
//!   local record points at
//! - **Password reset** - rotate the remote password and the stored copy
//!
//! Adapters are included for `SQLite` storage, the provisioning REST API,
//! AES-256-GCM credential encryption and the system keyring.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod credentials;
mod error;
pub mod fault;
pub mod provisioning;
pub mod reconcile;
pub mod registry;

pub use account::{
    AccountId, AccountStore, AuthMethod, Endpoint, LocalAccount, Security, SqliteAccountStore,
    ValidationError, ValidationResult, validate_account_request,
};
pub use credentials::{AesGcmEncryptor, CredentialEncryptor, CredentialError, CredentialResult};
pub use error::{Error, Result};
pub use fault::{FaultKind, ServiceFault, sanitize_message};
pub use provisioning::{
    HttpProvisioningClient, MailboxConfig, ProvisioningClient, RemoteFault, ServerConfig,
};
pub use reconcile::{
    AccountCreationOrchestrator, ConflictResolution, ConflictResolver, DeletionOutcome,
    DeletionReconciler, PasswordReset,
};
pub use registry::{DEFAULT_PROVIDER, ManagedMailboxProvider, ProviderRegistry};
