//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Crawl-Ledger database.

use rusqlite::Connection;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the database
///
/// `TaskResult.server` and `TaskResult.website_id` carry no foreign key
/// constraints: websites and servers are deleted independently of the log.
pub const SCHEMA_SQL: &str = r#"
-- Discovered websites (crawl roots)
CREATE TABLE IF NOT EXISTS Website (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    logged_ip TEXT,
    logged_useragent TEXT,
    last_modified TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_website_url ON Website(url);
CREATE INDEX IF NOT EXISTS idx_website_last_modified ON Website(last_modified);

-- Blacklisted origins (scheme://authority)
CREATE TABLE IF NOT EXISTS BlacklistedWebsite (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_blacklisted_url ON BlacklistedWebsite(url);

-- Remote crawl servers
CREATE TABLE IF NOT EXISTS CrawlServer (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    name TEXT NOT NULL,
    slots INTEGER NOT NULL,
    token TEXT NOT NULL
);

-- Completed crawl tasks
CREATE TABLE IF NOT EXISTS TaskResult (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    server INTEGER NOT NULL,
    website_id INTEGER NOT NULL,
    status_code INTEGER NOT NULL,
    file_count INTEGER NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    indexed_time TEXT
);

CREATE INDEX IF NOT EXISTS idx_task_result_server ON TaskResult(server);
CREATE INDEX IF NOT EXISTS idx_task_result_end_time ON TaskResult(end_time);

-- Administrator accounts
CREATE TABLE IF NOT EXISTS Admin (
    username TEXT PRIMARY KEY,
    password TEXT NOT NULL
);

-- API tokens
CREATE TABLE IF NOT EXISTS ApiToken (
    token TEXT PRIMARY KEY,
    description TEXT NOT NULL
);

-- Served search requests
CREATE TABLE IF NOT EXISTS SearchLogEntry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_addr TEXT NOT NULL,
    forwarded_for TEXT,
    query TEXT NOT NULL,
    extensions TEXT NOT NULL,
    page INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);
"#;

/// Applies the schema if the database has never been initialized
///
/// The schema version is checked first, so the script runs once per
/// database file. Returns `true` if the schema was applied.
pub fn initialize_schema(conn: &Connection) -> Result<bool, rusqlite::Error> {
    if get_schema_version(conn)? != 0 {
        return Ok(false);
    }

    conn.execute_batch(&format!(
        "BEGIN;\n{}\nPRAGMA user_version = {};\nCOMMIT;",
        SCHEMA_SQL, SCHEMA_VERSION
    ))?;

    Ok(true)
}

/// Gets the schema version recorded in the database (0 when uninitialized)
pub fn get_schema_version(conn: &Connection) -> Result<u32, rusqlite::Error> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}
