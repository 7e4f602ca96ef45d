//! API tokens and administrator accounts
//!
//! Tokens are random UUIDs and opaque to the rest of the crate. Account
//! passwords go through a `PasswordHasher` (bcrypt unless another is
//! injected); plaintext never reaches the database.

use crate::storage::sqlite::SqliteStore;
use crate::storage::traits::{
    CredentialStore, PasswordHasher, StorageError, StorageResult, TokenIssuer,
};
use crate::storage::ApiToken;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

impl TokenIssuer for SqliteStore {
    fn issue_token(&self, description: &str) -> StorageResult<String> {
        let token = Uuid::new_v4().to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ApiToken (token, description) VALUES (?1, ?2)",
            params![token, description],
        )?;
        tracing::info!(description, "issued api token");
        Ok(token)
    }

    fn revoke_token(&self, token: &str) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM ApiToken WHERE token = ?1", params![token])?;
        Ok(())
    }

    fn list_tokens(&self) -> StorageResult<Vec<ApiToken>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT token, description FROM ApiToken ORDER BY rowid")?;

        let tokens = stmt
            .query_map([], |row| {
                Ok(ApiToken {
                    token: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tokens)
    }

    fn token_is_valid(&self, token: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let valid = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM ApiToken WHERE token = ?1)",
            params![token],
            |row| row.get(0),
        )?;
        Ok(valid)
    }
}

/// bcrypt password hashing
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Creates a hasher with the given work factor (4 to 31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> StorageResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| StorageError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> StorageResult<bool> {
        bcrypt::verify(password, hash).map_err(|e| StorageError::Hashing(e.to_string()))
    }
}

/// Administrator accounts stored in the `Admin` table
pub struct SqliteCredentials<H> {
    store: SqliteStore,
    hasher: H,
}

impl<H: PasswordHasher> SqliteCredentials<H> {
    pub fn new(store: SqliteStore, hasher: H) -> Self {
        Self { store, hasher }
    }
}

impl<H: PasswordHasher> CredentialStore for SqliteCredentials<H> {
    fn create_account(&self, username: &str, password: &str) -> StorageResult<()> {
        let hash = self.hasher.hash_password(password)?;
        let conn = self.store.conn()?;
        conn.execute(
            "INSERT INTO Admin (username, password) VALUES (?1, ?2)",
            params![username, hash],
        )?;
        tracing::info!(username, "created admin account");
        Ok(())
    }

    fn verify_password(&self, username: &str, password: &str) -> StorageResult<bool> {
        let conn = self.store.conn()?;
        let hash: Option<String> = conn
            .query_row(
                "SELECT password FROM Admin WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;

        match hash {
            Some(hash) => self.hasher.verify(password, &hash),
            None => Ok(false),
        }
    }
}
