//! Local account management.
//!
//! Provides the account record, its storage and request validation.

mod model;
mod repository;
mod store;
mod validation;

pub use model::{AccountId, AuthMethod, Endpoint, LocalAccount, Security};
pub use repository::SqliteAccountStore;
pub use store::AccountStore;
pub use validation::{
    ValidationError, ValidationResult, is_valid_email, validate_account_request,
    validate_local_part,
};
