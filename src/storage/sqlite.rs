//! SQLite storage backend
//!
//! This module provides the pooled SQLite store that implements every
//! storage trait. Each operation checks out its own connection.

use crate::config::DatabaseConfig;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::StorageResult;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use std::path::Path;
use std::time::Duration;

/// Connection pool for SQLite
pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Pooled connection type
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Tuning for the connection pool
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub pool_size: u32,
    pub busy_timeout: Duration,
    pub connection_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout: Duration::from_millis(5000),
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&DatabaseConfig> for StoreOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            pool_size: config.pool_size,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            ..Self::default()
        }
    }
}

/// Pooled SQLite metadata store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens a store with default pool options
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_with(path, &StoreOptions::default())
    }

    /// Opens a store as described by the `[database]` configuration section
    pub fn from_config(config: &DatabaseConfig) -> StorageResult<Self> {
        Self::open_with(Path::new(&config.path), &StoreOptions::from(config))
    }

    /// Opens (creating if needed) a store at `path`
    ///
    /// The database is opened directly once before the pool is built, so an
    /// unreachable file fails fast as `StorageError::Connectivity`. The schema
    /// is applied on that connection the first time the file is opened.
    pub fn open_with(path: &Path, options: &StoreOptions) -> StorageResult<Self> {
        let busy_timeout = options.busy_timeout;

        let conn = Connection::open(path)?;
        configure_connection(&conn, busy_timeout)?;
        if initialize_schema(&conn)? {
            tracing::info!(path = %path.display(), "initialized metadata store schema");
        }
        drop(conn);

        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| configure_connection(conn, busy_timeout));

        let pool = Pool::builder()
            .max_size(options.pool_size)
            .connection_timeout(options.connection_timeout)
            .build(manager)?;

        tracing::debug!(path = %path.display(), pool_size = options.pool_size, "opened metadata store");
        Ok(Self { pool })
    }

    /// Creates an in-memory store
    ///
    /// The pool holds a single connection that is never recycled, since every
    /// in-memory connection is a separate database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        let store = Self { pool };
        store.bootstrap()?;
        Ok(store)
    }

    /// Checks out a connection from the pool
    pub(crate) fn conn(&self) -> StorageResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    fn bootstrap(&self) -> StorageResult<()> {
        let conn = self.conn()?;
        if initialize_schema(&conn)? {
            tracing::info!("initialized metadata store schema");
        }
        Ok(())
    }
}

/// Per-connection settings for file-backed stores
fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA temp_store = MEMORY;
    ",
    )
}

/// Formats a timestamp for storage
///
/// Fixed-width UTC text, so string order in SQL equals chronological order.
pub(crate) fn to_db_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time, truncated to the precision that is stored
pub(crate) fn db_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::parse_from_rfc3339(&to_db_timestamp(&now))
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Reads a stored timestamp column
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable stored timestamp column
pub(crate) fn optional_timestamp_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Checks whether a row with the given ID exists in `table`
pub(crate) fn row_exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table),
        [id],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::get_schema_version;
    use crate::storage::StorageError;
    use crate::storage::SCHEMA_VERSION;
    use chrono::TimeZone;

    #[test]
    fn test_create_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_open_file_applies_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let store = SqliteStore::open(&path).unwrap();
        let conn = store.conn().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_unreachable_path_is_connectivity_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ledger.db");

        let started = std::time::Instant::now();
        let result = SqliteStore::open(&path);

        assert!(matches!(result, Err(StorageError::Connectivity(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let fractional = whole + chrono::Duration::microseconds(7);

        let a = to_db_timestamp(&whole);
        let b = to_db_timestamp(&fractional);

        assert_eq!(a, "2024-01-02T03:04:05.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_db_now_roundtrips_exactly() {
        let now = db_now();
        let stored = to_db_timestamp(&now);
        let parsed = DateTime::parse_from_rfc3339(&stored).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), now);
    }
}
