//! `SQLite` account storage.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::model::{AccountId, AuthMethod, Endpoint, LocalAccount, Security};
use super::store::AccountStore;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = r"
    SELECT id, user_id, display_name, email, auth_method,
           inbound_host, inbound_port, inbound_security, inbound_user, inbound_password,
           outbound_host, outbound_port, outbound_security, outbound_user, outbound_password
    FROM accounts
";

/// `SQLite`-backed [`AccountStore`].
///
/// Passwords are stored exactly as handed over, i.e. already encrypted.
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                email TEXT NOT NULL COLLATE NOCASE,
                auth_method TEXT NOT NULL,
                inbound_host TEXT NOT NULL,
                inbound_port INTEGER NOT NULL,
                inbound_security TEXT NOT NULL,
                inbound_user TEXT NOT NULL,
                inbound_password TEXT NOT NULL,
                outbound_host TEXT NOT NULL,
                outbound_port INTEGER NOT NULL,
                outbound_security TEXT NOT NULL,
                outbound_user TEXT NOT NULL,
                outbound_password TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (user_id, email)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Count the accounts belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_for_user(&self, user_id: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn find_by_user_and_address(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<LocalAccount>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND email = ? LIMIT 1"
        ))
        .bind(user_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    async fn find_by_id(&self, user_id: &str, id: AccountId) -> Result<Option<LocalAccount>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE user_id = ? AND id = ?"))
            .bind(user_id)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    async fn save(&self, mut account: LocalAccount) -> Result<LocalAccount> {
        let result = sqlx::query(
            r"
            INSERT INTO accounts (
                user_id, display_name, email, auth_method,
                inbound_host, inbound_port, inbound_security, inbound_user, inbound_password,
                outbound_host, outbound_port, outbound_security, outbound_user, outbound_password
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&account.user_id)
        .bind(&account.display_name)
        .bind(&account.email)
        .bind(account.auth_method.as_str())
        .bind(&account.inbound.host)
        .bind(i64::from(account.inbound.port))
        .bind(account.inbound.security.as_str())
        .bind(&account.inbound.user)
        .bind(&account.inbound.encrypted_password)
        .bind(&account.outbound.host)
        .bind(i64::from(account.outbound.port))
        .bind(account.outbound.security.as_str())
        .bind(&account.outbound.user)
        .bind(&account.outbound.encrypted_password)
        .execute(&self.pool)
        .await?;

        let id = AccountId::new(result.last_insert_rowid());
        account.id = Some(id);
        debug!(account_id = %id, user_id = %account.user_id, "Inserted local account");
        Ok(account)
    }

    async fn update(&self, account: LocalAccount) -> Result<LocalAccount> {
        let id = account
            .id
            .ok_or_else(|| Error::AccountNotFound(format!("{} (unsaved)", account.email)))?;

        let result = sqlx::query(
            r"
            UPDATE accounts SET
                display_name = ?, email = ?, auth_method = ?,
                inbound_host = ?, inbound_port = ?, inbound_security = ?,
                inbound_user = ?, inbound_password = ?,
                outbound_host = ?, outbound_port = ?, outbound_security = ?,
                outbound_user = ?, outbound_password = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(&account.display_name)
        .bind(&account.email)
        .bind(account.auth_method.as_str())
        .bind(&account.inbound.host)
        .bind(i64::from(account.inbound.port))
        .bind(account.inbound.security.as_str())
        .bind(&account.inbound.user)
        .bind(&account.inbound.encrypted_password)
        .bind(&account.outbound.host)
        .bind(i64::from(account.outbound.port))
        .bind(account.outbound.security.as_str())
        .bind(&account.outbound.user)
        .bind(&account.outbound.encrypted_password)
        .bind(id.0)
        .bind(&account.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound(id.to_string()));
        }

        debug!(account_id = %id, user_id = %account.user_id, "Updated local account");
        Ok(account)
    }

    async fn delete(&self, user_id: &str, id: AccountId) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE id = ? AND user_id = ?")
            .bind(id.0)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(account_id = %id, user_id, "Deleted local account");
        Ok(())
    }
}

/// Convert a database row to a [`LocalAccount`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> LocalAccount {
    LocalAccount {
        id: Some(AccountId::new(row.get("id"))),
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        auth_method: AuthMethod::parse(row.get("auth_method")),
        inbound: Endpoint {
            host: row.get("inbound_host"),
            port: row.get::<i64, _>("inbound_port") as u16,
            security: string_to_security(row.get("inbound_security")),
            user: row.get("inbound_user"),
            encrypted_password: row.get("inbound_password"),
        },
        outbound: Endpoint {
            host: row.get("outbound_host"),
            port: row.get::<i64, _>("outbound_port") as u16,
            security: string_to_security(row.get("outbound_security")),
            user: row.get("outbound_user"),
            encrypted_password: row.get("outbound_password"),
        },
    }
}

fn string_to_security(s: &str) -> Security {
    match s {
        "tls" => Security::Tls,
        "ssl" => Security::Ssl,
        _ => Security::None,
    }
}
