//! Operator settings.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Application directory name under the platform config and data dirs.
const APP_DIR: &str = "mailprov";

/// Settings that persist across runs, read from `settings.json`.
///
/// Every field has a default; environment variables override the file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the provisioning API.
    pub api_url: String,
    /// Provisioning API user.
    pub api_user: String,
    /// Provisioning API password. Read from the keyring when unset.
    pub api_password: Option<String>,
    /// Domain mailboxes are created under.
    pub domain: String,
    /// Path of the `SQLite` account database.
    pub database: Option<PathBuf>,
    /// Base64 AES-256 key for stored passwords. Read from the keyring when unset.
    pub encryption_key: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api/v1".to_string(),
            api_user: "mailprov".to_string(),
            api_password: None,
            domain: "localhost".to_string(),
            database: None,
            encryption_key: None,
            timeout_secs: mailprov_api::DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("api_user", &self.api_user)
            .field("api_password", &self.api_password.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("database", &self.database)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Default location of `settings.json`.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.json")
}

/// Default location of the account database.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("accounts.db")
}

impl Settings {
    /// Loads settings from a file (default location when `None`), then
    /// applies environment overrides. A missing file yields the defaults.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.map_or_else(default_settings_path, Path::to_path_buf);

        let mut settings = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            Self::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Overrides fields from `MAILPROV_*` variables found by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MAILPROV_API_URL") {
            self.api_url = url;
        }
        if let Some(user) = lookup("MAILPROV_API_USER") {
            self.api_user = user;
        }
        if let Some(password) = lookup("MAILPROV_API_PASSWORD") {
            self.api_password = Some(password);
        }
        if let Some(domain) = lookup("MAILPROV_DOMAIN") {
            self.domain = domain;
        }
        if let Some(database) = lookup("MAILPROV_DATABASE") {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(key) = lookup("MAILPROV_ENCRYPTION_KEY") {
            self.encryption_key = Some(key);
        }
    }

    /// Account database path, falling back to the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"domain": "example.com"}"#).unwrap();
        assert_eq!(settings.domain, "example.com");
        assert_eq!(settings.timeout_secs, 30);
        assert!(!settings.accept_invalid_certs);
        assert_eq!(settings.api_password, None);
    }

    #[test]
    fn environment_overrides_file() {
        let mut settings = Settings {
            domain: "file.example".to_string(),
            ..Settings::default()
        };
        settings.apply_overrides(|key| match key {
            "MAILPROV_DOMAIN" => Some("env.example".to_string()),
            "MAILPROV_DATABASE" => Some("/tmp/accounts.db".to_string()),
            _ => None,
        });

        assert_eq!(settings.domain, "env.example");
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/accounts.db"));
        assert_eq!(settings.api_user, "mailprov");
    }

    #[test]
    fn debug_redacts_secrets() {
        let settings = Settings {
            api_password: Some("hunter2".to_string()),
            encryption_key: Some("c2VjcmV0".to_string()),
            ..Settings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("c2VjcmV0"));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let path = std::env::temp_dir()
            .join(format!("mailprov-settings-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"timeout_secs": 5}"#)
            .await
            .unwrap();

        let settings = Settings::load(Some(&path)).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(settings.timeout_secs, 5);
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("mailprov-settings-does-not-exist.json");
        let settings = Settings::load(Some(&path)).await.unwrap();
        assert_eq!(settings.timeout_secs, 30);
    }
}
