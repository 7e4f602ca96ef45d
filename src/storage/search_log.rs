//! Search request telemetry backed by the `SearchLogEntry` table

use crate::storage::sqlite::{db_now, to_db_timestamp, SqliteStore};
use crate::storage::traits::{SearchLog, StorageResult};
use rusqlite::params;

/// Separator used when storing the requested extensions
const EXTENSION_SEPARATOR: &str = ",";

impl SearchLog for SqliteStore {
    fn log_search(
        &self,
        remote_addr: &str,
        forwarded_for: Option<&str>,
        query: &str,
        extensions: &[&str],
        page: u32,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO SearchLogEntry (remote_addr, forwarded_for, query, extensions, page, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                remote_addr,
                forwarded_for,
                query,
                extensions.join(EXTENSION_SEPARATOR),
                page,
                to_db_timestamp(&db_now()),
            ],
        )?;
        Ok(())
    }
}
