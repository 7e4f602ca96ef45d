//! Origin blacklist backed by the `BlacklistedWebsite` table
//!
//! Entries and candidates are both reduced to `scheme://authority` before
//! comparison, and compared literally.

use crate::storage::sqlite::SqliteStore;
use crate::storage::traits::{BlacklistPolicy, StorageResult};
use crate::storage::BlacklistedWebsite;
use crate::url::origin_of;
use rusqlite::{params, Connection};

/// Checks an already reduced origin on an existing connection or transaction
pub(crate) fn origin_is_blacklisted(conn: &Connection, origin: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM BlacklistedWebsite WHERE url = ?1)",
        params![origin],
        |row| row.get(0),
    )
}

impl BlacklistPolicy for SqliteStore {
    fn add_blacklist(&self, url: &str) -> StorageResult<i64> {
        let origin = origin_of(url)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO BlacklistedWebsite (url) VALUES (?1)",
            params![origin],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(blacklist_id = id, origin = %origin, "blacklisted origin");
        Ok(id)
    }

    fn remove_blacklist(&self, blacklist_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM BlacklistedWebsite WHERE id = ?1",
            params![blacklist_id],
        )?;
        tracing::info!(blacklist_id, "removed blacklist entry");
        Ok(())
    }

    fn is_blacklisted(&self, url: &str) -> StorageResult<bool> {
        let origin = origin_of(url)?;
        let conn = self.conn()?;
        let blacklisted = origin_is_blacklisted(&conn, &origin)?;
        if blacklisted {
            tracing::debug!(url, origin = %origin, "url is blacklisted");
        }
        Ok(blacklisted)
    }

    fn list_blacklist(&self) -> StorageResult<Vec<BlacklistedWebsite>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, url FROM BlacklistedWebsite ORDER BY id")?;

        let entries = stmt
            .query_map([], |row| {
                Ok(BlacklistedWebsite {
                    id: row.get(0)?,
                    origin: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
