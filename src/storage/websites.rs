//! Website registry backed by the `Website` table

use crate::storage::sqlite::{db_now, timestamp_column, to_db_timestamp, SqliteStore};
use crate::storage::traits::{StorageResult, WebsiteRegistry};
use crate::storage::{Website, WebsiteListing};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const WEBSITE_COLUMNS: &str = "id, url, logged_ip, logged_useragent, last_modified";

fn website_from_row(row: &Row<'_>) -> rusqlite::Result<Website> {
    Ok(Website {
        id: row.get(0)?,
        url: row.get(1)?,
        logged_ip: row.get(2)?,
        logged_useragent: row.get(3)?,
        last_modified: timestamp_column(row, 4)?,
    })
}

/// Inserts a website row on an existing connection or transaction
pub(crate) fn insert_row(
    conn: &Connection,
    url: &str,
    logged_ip: Option<&str>,
    logged_useragent: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO Website (url, logged_ip, logged_useragent, last_modified) VALUES (?1, ?2, ?3, ?4)",
        params![url, logged_ip, logged_useragent, to_db_timestamp(&db_now())],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds a website whose URL is a character prefix of `url`
pub(crate) fn find_covering(conn: &Connection, url: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM Website WHERE url = substr(?1, 1, length(url)) ORDER BY id LIMIT 1",
        params![url],
        |row| row.get(0),
    )
    .optional()
}

impl SqliteStore {
    /// Gets IDs of websites last modified strictly before `cutoff`
    pub fn websites_modified_before(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id FROM Website WHERE last_modified < ?1 ORDER BY id")?;

        let ids = stmt
            .query_map(params![to_db_timestamp(&cutoff)], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }
}

impl WebsiteRegistry for SqliteStore {
    fn insert_website(
        &self,
        url: &str,
        logged_ip: Option<&str>,
        logged_useragent: Option<&str>,
    ) -> StorageResult<i64> {
        let conn = self.conn()?;
        let id = insert_row(&conn, url, logged_ip, logged_useragent)?;
        tracing::debug!(website_id = id, url, "inserted website");
        Ok(id)
    }

    fn touch_website(&self, website_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE Website SET last_modified = ?1 WHERE id = ?2",
            params![to_db_timestamp(&db_now()), website_id],
        )?;
        Ok(())
    }

    fn website_by_url(&self, url: &str) -> StorageResult<Option<Website>> {
        let conn = self.conn()?;
        let website = conn
            .query_row(
                &format!("SELECT {} FROM Website WHERE url = ?1", WEBSITE_COLUMNS),
                params![url],
                website_from_row,
            )
            .optional()?;
        Ok(website)
    }

    fn website_by_id(&self, website_id: i64) -> StorageResult<Option<Website>> {
        let conn = self.conn()?;
        let website = conn
            .query_row(
                &format!("SELECT {} FROM Website WHERE id = ?1", WEBSITE_COLUMNS),
                params![website_id],
                website_from_row,
            )
            .optional()?;
        Ok(website)
    }

    fn website_exists(&self, url: &str) -> StorageResult<Option<i64>> {
        let conn = self.conn()?;
        Ok(find_covering(&conn, url)?)
    }

    fn list_websites(
        &self,
        per_page: u32,
        page: u32,
        url_prefix: &str,
    ) -> StorageResult<Vec<WebsiteListing>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, last_modified FROM Website
             WHERE substr(url, 1, length(?1)) = ?1
             ORDER BY last_modified DESC, id DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let offset = i64::from(page) * i64::from(per_page);
        let websites = stmt
            .query_map(params![url_prefix, per_page, offset], |row| {
                Ok(WebsiteListing {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    last_modified: timestamp_column(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(websites)
    }

    fn random_website_id(&self) -> StorageResult<Option<i64>> {
        let conn = self.conn()?;
        let id = conn
            .query_row(
                "SELECT id FROM Website
                 WHERE id >= (abs(random()) % (SELECT max(id) FROM Website))
                 ORDER BY id LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn websites_older_than(&self, delta: chrono::Duration) -> StorageResult<Vec<i64>> {
        self.websites_modified_before(db_now() - delta)
    }

    fn delete_website(&self, website_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM Website WHERE id = ?1", params![website_id])?;
        if deleted > 0 {
            tracing::info!(website_id, "deleted website");
        }
        Ok(())
    }

    fn all_websites(&self) -> StorageResult<HashMap<i64, String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, url FROM Website")?;

        let mut websites = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (id, url) = row?;
            websites.insert(id, url);
        }

        Ok(websites)
    }
}
