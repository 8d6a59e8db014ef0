//! Reconciliation between local account records and remote mailboxes.
//!
//! A managed mailbox lives in two stores that fail independently: the local
//! account store and the provisioning service. Every operation here reads
//! the local store first, then talks to the provisioning service, and writes
//! the local store last.

mod address;
mod deletion;
mod orchestrator;
mod password;
mod resolution;
mod resolver;

pub use address::{domain_matches, domain_of, emails_match, expected_email};
pub use deletion::{DeletionOutcome, DeletionReconciler};
pub use orchestrator::AccountCreationOrchestrator;
pub use password::PasswordReset;
pub use resolution::ConflictResolution;
pub use resolver::ConflictResolver;
