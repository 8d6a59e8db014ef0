//! Remote mailbox provisioning.

mod client;
mod http;
mod model;

pub use client::{ProvisioningClient, RemoteFault};
pub use http::HttpProvisioningClient;
pub use model::{MailboxConfig, ServerConfig};
