//! Storage module for the crawl metadata store
//!
//! This module handles all database operations, including:
//! - SQLite connection pooling and one-time schema bootstrap
//! - The website registry with prefix deduplication and staleness queries
//! - The origin blacklist
//! - The crawl server fleet and its task result log
//! - Search telemetry, API tokens and administrator accounts

mod accounts;
pub(crate) mod blacklist;
mod fleet;
mod schema;
mod search_log;
mod sqlite;
mod tasks;
mod traits;
pub(crate) mod websites;

pub use accounts::{BcryptHasher, SqliteCredentials};
pub use schema::{get_schema_version, initialize_schema, SCHEMA_VERSION};
pub use sqlite::{SqliteStore, StoreOptions};
pub use traits::{
    BlacklistPolicy, CredentialStore, CrawlFleetRegistry, PasswordHasher, SearchLog,
    StorageError, StorageResult, TaskResultLog, TokenIssuer, WebsiteRegistry,
};

use chrono::{DateTime, Utc};

/// A discovered website
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Website {
    pub id: i64,
    pub url: String,
    pub logged_ip: Option<String>,
    pub logged_useragent: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// One row of the paginated website listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteListing {
    pub id: i64,
    pub url: String,
    pub last_modified: DateTime<Utc>,
}

/// A blacklisted origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistedWebsite {
    pub id: i64,
    /// `scheme://authority`, without path or query
    pub origin: String,
}

/// A registered remote crawl server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlServer {
    pub id: i64,
    pub url: String,
    pub name: String,
    /// Maximum number of concurrent tasks the server accepts
    pub slots: u32,
    /// Authenticates callbacks from the server
    pub token: String,
}

/// A crawl server that has not been registered yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrawlServer {
    pub url: String,
    pub name: String,
    pub slots: u32,
    pub token: String,
}

/// Outcome of one crawl task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub server_id: i64,
    pub website_id: i64,
    pub status_code: i64,
    pub file_count: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub indexed_time: Option<DateTime<Utc>>,
    /// Filled in on read from the owning crawl server; ignored on append
    pub server_name: Option<String>,
}

impl TaskResult {
    /// Wall-clock duration of the task in seconds
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// Aggregated task statistics for one crawl server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerStats {
    /// Total files reported
    pub file_count: i64,
    /// Total task time in seconds
    pub time: f64,
    pub task_count: i64,
    pub time_avg: f64,
    pub file_count_avg: f64,
}

/// An issued API token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken {
    pub token: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_duration() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let result = TaskResult {
            server_id: 1,
            website_id: 1,
            status_code: 200,
            file_count: 3,
            start_time: start,
            end_time: start + chrono::Duration::milliseconds(2500),
            indexed_time: None,
            server_name: None,
        };

        assert_eq!(result.duration_secs(), 2.5);
    }
}
