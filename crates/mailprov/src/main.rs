//! `mailprov` - operator command line for managed mailboxes.
//!
//! Wires the reconciliation engine from `settings.json` and prints every
//! result as JSON on stdout. Logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailprov_api::{ApiConfig, ProvisioningApi};
use mailprov_core::credentials::keychain;
use mailprov_core::{
    AccountId, AesGcmEncryptor, DEFAULT_PROVIDER, HttpProvisioningClient, ManagedMailboxProvider,
    ProviderRegistry, ServiceFault, SqliteAccountStore,
};

use settings::Settings;

#[derive(Parser)]
#[command(name = "mailprov")]
#[command(about = "Provision and reconcile managed mailboxes", long_about = None)]
struct Cli {
    /// Settings file [default: <config dir>/mailprov/settings.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Mailbox provider id
    #[arg(long, global = true, default_value = DEFAULT_PROVIDER)]
    provider: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a managed mailbox account, or repair an existing one
    Create {
        /// Owning user id
        user: String,
        /// Mailbox name (the part before the @)
        local_part: String,
        /// Display name [default: the mailbox name]
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a local account and its remote mailbox
    Delete {
        /// Owning user id
        user: String,
        /// Local account id
        id: i64,
    },
    /// Issue a new mailbox password
    ResetPassword {
        /// Owning user id
        user: String,
        /// Local account id
        id: i64,
    },
    /// Show how a request would relate to the user's remote mailbox
    Status {
        /// Owning user id
        user: String,
        /// Mailbox name (the part before the @)
        local_part: String,
    },
    /// Store the provisioning API password in the keyring, read from stdin
    SetApiPassword {
        /// Remove the stored password instead
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailprov=info,mailprov_core=info,mailprov_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(value) => {
            print_json(&value);
            ExitCode::SUCCESS
        }
        Err(err) => match err.downcast::<ServiceFault>() {
            Ok(fault) => {
                print_json(&json!({ "error": fault }));
                if fault.is_client_error() {
                    ExitCode::from(2)
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(err) => {
                error!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => error!("Failed to render output: {e}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    if let Command::SetApiPassword { clear } = cli.command {
        return set_api_password(&cli.provider, clear).await;
    }

    let settings = Settings::load(cli.config.as_deref()).await?;
    let registry = build_registry(&settings, &cli.provider).await?;
    let provider = registry.get(&cli.provider)?;

    let value = match cli.command {
        Command::SetApiPassword { .. } => json!(null),
        Command::Create {
            user,
            local_part,
            name,
        } => {
            let display_name = name.unwrap_or_else(|| local_part.clone());
            let account = provider
                .create_or_update_account(&user, &local_part, &display_name)
                .await?;
            serde_json::to_value(account)?
        }
        Command::Delete { user, id } => {
            let outcome = provider.delete_account(&user, AccountId::new(id)).await?;
            json!({ "account_id": id, "remote": outcome })
        }
        Command::ResetPassword { user, id } => {
            let account = provider.reset_password(&user, AccountId::new(id)).await?;
            serde_json::to_value(account)?
        }
        Command::Status { user, local_part } => {
            let resolution = provider.resolve(&user, &local_part).await?;
            serde_json::to_value(resolution)?
        }
    };

    Ok(value)
}

/// Stores (or clears) the provider's API password in the keyring. The
/// password is the first line of stdin.
async fn set_api_password(provider_id: &str, clear: bool) -> anyhow::Result<serde_json::Value> {
    if clear {
        keychain::delete_api_password(provider_id)?;
        info!("Cleared API password for provider {provider_id}");
        return Ok(json!({ "provider": provider_id, "api_password": "cleared" }));
    }

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("reading API password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("No API password on stdin");
    }

    keychain::store_api_password(provider_id, password)?;
    info!("Stored API password for provider {provider_id}");
    Ok(json!({ "provider": provider_id, "api_password": "stored" }))
}

/// Builds the provider registry from settings. Secrets missing from the
/// settings are read from the system keyring.
async fn build_registry(settings: &Settings, provider_id: &str) -> anyhow::Result<ProviderRegistry> {
    let api_password = match &settings.api_password {
        Some(password) => password.clone(),
        None => match keychain::get_api_password(provider_id)? {
            Some(password) => password,
            None => bail!(
                "No provisioning API password: set MAILPROV_API_PASSWORD or run `mailprov set-api-password`"
            ),
        },
    };

    let api_config = ApiConfig::new(
        &settings.api_url,
        &settings.api_user,
        api_password,
        &settings.domain,
    )?
    .with_timeout(Duration::from_secs(settings.timeout_secs))
    .with_accept_invalid_certs(settings.accept_invalid_certs);
    let api = ProvisioningApi::new(api_config)?;

    let database_path = settings.database_path();
    if let Some(parent) = database_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let database = database_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    let store = SqliteAccountStore::new(database).await?;

    let key = match &settings.encryption_key {
        Some(key) => key.clone(),
        None => keychain::load_or_create_master_key(provider_id)?,
    };
    let encryptor = AesGcmEncryptor::from_base64(&key)?;

    info!(
        "Using provider {provider_id} for domain {} with database {database}",
        settings.domain
    );

    Ok(ProviderRegistry::new().with_provider(ManagedMailboxProvider::new(
        provider_id,
        Arc::new(HttpProvisioningClient::new(api)),
        Arc::new(store),
        Arc::new(encryptor),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_defaults() {
        let cli = Cli::try_parse_from(["mailprov", "create", "user-1", "john"]).unwrap_or_else(|e| {
            panic!("{e}");
        });
        assert_eq!(cli.provider, "managed");
        assert!(matches!(
            cli.command,
            Command::Create { ref user, ref local_part, name: None } if user == "user-1" && local_part == "john"
        ));
    }

    #[test]
    fn parses_reset_password_with_provider() {
        let cli = Cli::try_parse_from([
            "mailprov",
            "reset-password",
            "user-1",
            "7",
            "--provider",
            "staging",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.provider, "staging");
        assert!(matches!(cli.command, Command::ResetPassword { id: 7, .. }));
    }

    #[test]
    fn parses_set_api_password() {
        let cli = Cli::try_parse_from(["mailprov", "set-api-password", "--provider", "staging"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.provider, "staging");
        assert!(matches!(cli.command, Command::SetApiPassword { clear: false }));

        let cli = Cli::try_parse_from(["mailprov", "set-api-password", "--clear"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Command::SetApiPassword { clear: true }));
    }
}
