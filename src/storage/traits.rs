//! Storage traits and error types
//!
//! This module defines one trait per component of the metadata store and the
//! error type they share. `SqliteStore` implements all of them.

use crate::storage::{
    ApiToken, BlacklistedWebsite, CrawlServer, NewCrawlServer, ServerStats, TaskResult, Website,
    WebsiteListing,
};
use crate::UrlError;
use rusqlite::ErrorCode;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Lookups that find nothing are not errors; they return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database unavailable: {0}")]
    Connectivity(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] UrlError),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
            _ => None,
        };

        match code {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(err.to_string()),
            Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt) => {
                Self::Connectivity(err.to_string())
            }
            _ => Self::Sqlite(err),
        }
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        Self::Connectivity(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Canonical store of discovered websites
pub trait WebsiteRegistry {
    /// Inserts a website; `last_modified` starts at the current time
    ///
    /// # Returns
    ///
    /// The ID of the newly created website
    fn insert_website(
        &self,
        url: &str,
        logged_ip: Option<&str>,
        logged_useragent: Option<&str>,
    ) -> StorageResult<i64>;

    /// Sets `last_modified` to the current time. Unknown IDs are ignored.
    fn touch_website(&self, website_id: i64) -> StorageResult<()>;

    /// Gets a website by exact URL
    fn website_by_url(&self, url: &str) -> StorageResult<Option<Website>>;

    /// Gets a website by ID
    fn website_by_id(&self, website_id: i64) -> StorageResult<Option<Website>>;

    /// Finds a stored website whose URL is a string prefix of `url`
    ///
    /// The comparison is a raw character prefix, not path-segment aware:
    /// a stored `http://example.com/a` covers `http://example.com/abc`.
    fn website_exists(&self, url: &str) -> StorageResult<Option<i64>>;

    /// Lists one page of websites whose URL starts with `url_prefix`,
    /// most recently modified first
    fn list_websites(
        &self,
        per_page: u32,
        page: u32,
        url_prefix: &str,
    ) -> StorageResult<Vec<WebsiteListing>>;

    /// Picks a random existing website ID, biased toward IDs that follow gaps
    fn random_website_id(&self) -> StorageResult<Option<i64>>;

    /// Gets IDs of websites last modified strictly before `now - delta`
    fn websites_older_than(&self, delta: chrono::Duration) -> StorageResult<Vec<i64>>;

    /// Deletes a website. Task results referencing it are left in place.
    fn delete_website(&self, website_id: i64) -> StorageResult<()>;

    /// Loads every website as an `id -> url` map
    ///
    /// This is a full table scan on every call.
    fn all_websites(&self) -> StorageResult<HashMap<i64, String>>;
}

/// Origin deny-list consulted before crawling or serving a URL
pub trait BlacklistPolicy {
    /// Blacklists the origin of `url`
    ///
    /// # Returns
    ///
    /// The ID of the new blacklist entry
    fn add_blacklist(&self, url: &str) -> StorageResult<i64>;

    /// Removes a blacklist entry
    fn remove_blacklist(&self, blacklist_id: i64) -> StorageResult<()>;

    /// Checks whether the origin of `url` is blacklisted
    fn is_blacklisted(&self, url: &str) -> StorageResult<bool>;

    /// Gets all blacklist entries
    fn list_blacklist(&self) -> StorageResult<Vec<BlacklistedWebsite>>;
}

/// Registered remote crawl servers
pub trait CrawlFleetRegistry {
    /// Registers a crawl server
    ///
    /// # Returns
    ///
    /// The ID of the newly registered server
    fn register_server(&self, server: &NewCrawlServer) -> StorageResult<i64>;

    /// Removes a crawl server from the fleet
    fn unregister_server(&self, server_id: i64) -> StorageResult<()>;

    /// Gets all registered crawl servers
    fn list_servers(&self) -> StorageResult<Vec<CrawlServer>>;

    /// Updates a server's endpoint, name and capacity. The token never changes.
    fn update_server(&self, server_id: i64, url: &str, name: &str, slots: u32)
        -> StorageResult<()>;
}

/// Append-only ledger of completed crawl tasks
pub trait TaskResultLog {
    /// Appends a task result
    ///
    /// Fails with `ConstraintViolation` if the server or website does not
    /// exist. Not idempotent: do not retry blindly after an ambiguous failure.
    fn append_result(&self, result: &TaskResult) -> StorageResult<()>;

    /// Gets all task results whose server and website still exist,
    /// most recently finished first, with `server_name` filled in
    fn list_results(&self) -> StorageResult<Vec<TaskResult>>;

    /// Aggregates task results per server name
    ///
    /// Servers without any task result are omitted.
    fn stats_by_server(&self) -> StorageResult<HashMap<String, ServerStats>>;
}

/// Write-only telemetry of served search requests
pub trait SearchLog {
    /// Records one served search request
    fn log_search(
        &self,
        remote_addr: &str,
        forwarded_for: Option<&str>,
        query: &str,
        extensions: &[&str],
        page: u32,
    ) -> StorageResult<()>;
}

/// Issues and checks opaque API tokens
pub trait TokenIssuer {
    /// Issues a new unique token
    fn issue_token(&self, description: &str) -> StorageResult<String>;

    /// Revokes a token. Unknown tokens are ignored.
    fn revoke_token(&self, token: &str) -> StorageResult<()>;

    /// Gets all issued tokens
    fn list_tokens(&self) -> StorageResult<Vec<ApiToken>>;

    /// Checks whether a token has been issued and not revoked
    fn token_is_valid(&self, token: &str) -> StorageResult<bool>;
}

/// Administrator accounts
pub trait CredentialStore {
    /// Creates an administrator account
    fn create_account(&self, username: &str, password: &str) -> StorageResult<()>;

    /// Checks a username/password pair
    fn verify_password(&self, username: &str, password: &str) -> StorageResult<bool>;
}

/// Password hashing primitive used by credential stores
///
/// Implementations wrap a slow, salted algorithm. `BcryptHasher` is the
/// default.
pub trait PasswordHasher: Send + Sync {
    /// Produces a self-describing hash of `password`
    fn hash_password(&self, password: &str) -> StorageResult<String>;

    /// Checks `password` against a hash produced by `hash_password`
    ///
    /// A hash this hasher cannot read is a `StorageError::Hashing`.
    fn verify(&self, password: &str, hash: &str) -> StorageResult<bool>;
}
