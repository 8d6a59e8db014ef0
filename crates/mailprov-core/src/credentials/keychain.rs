//! Secret storage in the system keyring.
//!
//! Holds the secrets the operator should not keep in plain configuration:
//! - the master key of the credential encryptor
//! - the provisioning API password
//!
//! Backed by the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use ::keyring::Entry;
use tracing::{debug, warn};

use super::encryptor::generate_key;
use super::{CredentialError, CredentialResult};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailprov";

/// Entry name for the credential encryption master key.
const MASTER_KEY_CREDENTIAL: &str = "master_key";

/// Entry name prefix for provisioning API passwords.
const API_PASSWORD_CREDENTIAL: &str = "api_password";

/// Generates the keyring entry key for a credential.
fn credential_key(credential_type: &str, scope: &str) -> String {
    format!("{SERVICE_NAME}_{credential_type}_{scope}")
}

fn read_entry(key: &str) -> CredentialResult<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(::keyring::Error::NoEntry) => {
            debug!("No keyring entry {key}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn delete_entry(key: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted keyring entry {key}");
            Ok(())
        }
        Err(::keyring::Error::NoEntry) => {
            debug!("No keyring entry {key} to delete");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete keyring entry {key}: {e}");
            Err(e.into())
        }
    }
}

/// Retrieves the base64 master key for a key profile.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_master_key(profile: &str) -> CredentialResult<Option<String>> {
    read_entry(&credential_key(MASTER_KEY_CREDENTIAL, profile))
}

/// Stores a base64 master key for a key profile.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_master_key(profile: &str, key: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(MASTER_KEY_CREDENTIAL, profile))?;
    entry.set_password(key)?;
    debug!("Stored master key for profile {profile}");
    Ok(())
}

/// Loads the master key for a profile, generating and storing one on first use.
///
/// # Errors
///
/// Returns an error if the keyring cannot be read or written.
pub fn load_or_create_master_key(profile: &str) -> CredentialResult<String> {
    if let Some(key) = get_master_key(profile)? {
        return Ok(key);
    }

    let key = generate_key();
    store_master_key(profile, &key)?;
    warn!("Generated a new credential master key for profile {profile}");
    Ok(key)
}

/// Stores the provisioning API password for a provider.
///
/// # Errors
///
/// Returns an error if the provider id is empty or the keyring operation fails.
pub fn store_api_password(provider_id: &str, password: &str) -> CredentialResult<()> {
    if provider_id.is_empty() {
        return Err(CredentialError::MissingScope);
    }
    let entry = Entry::new(SERVICE_NAME, &credential_key(API_PASSWORD_CREDENTIAL, provider_id))?;
    entry.set_password(password)?;
    debug!("Stored API password for provider {provider_id}");
    Ok(())
}

/// Retrieves the provisioning API password for a provider.
///
/// # Errors
///
/// Returns an error if the provider id is empty or the keyring operation fails.
pub fn get_api_password(provider_id: &str) -> CredentialResult<Option<String>> {
    if provider_id.is_empty() {
        return Err(CredentialError::MissingScope);
    }
    read_entry(&credential_key(API_PASSWORD_CREDENTIAL, provider_id))
}

/// Deletes the provisioning API password for a provider.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_api_password(provider_id: &str) -> CredentialResult<()> {
    delete_entry(&credential_key(API_PASSWORD_CREDENTIAL, provider_id))
}
