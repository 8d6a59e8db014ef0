//! # mailprov-api
//!
//! REST client for the remote mailbox provisioning service.
//!
//! The service owns the real mailboxes; this crate only speaks its HTTP API:
//!
//! - `POST   {base}/users/{user}/mailbox` creates a mailbox (409 if one exists)
//! - `GET    {base}/users/{user}/mailbox` fetches it (404 when absent)
//! - `DELETE {base}/users/{user}/mailbox` removes it (404 is not an error)
//! - `POST   {base}/users/{user}/mailbox/password` issues a new password
//!
//! ## Example
//!
//! ```ignore
//! use mailprov_api::{ApiConfig, ProvisioningApi};
//!
//! let config = ApiConfig::new("https://prov.example.net/api/v1", "svc", "secret", "example.com")?;
//! let api = ProvisioningApi::new(config)?;
//! let mailbox = api.create_mailbox("user-42", "john").await?;
//! println!("Provisioned {}", mailbox.email);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
mod error;
pub mod types;

pub use client::{ApiConfig, DEFAULT_TIMEOUT_SECS, ProvisioningApi};
pub use error::{Error, Result};
pub use types::{CreateMailboxRequest, DeleteOutcome, MailboxResponse, PasswordResponse, ServerResponse};
