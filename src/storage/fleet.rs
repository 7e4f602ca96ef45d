//! Crawl server fleet backed by the `CrawlServer` table

use crate::storage::sqlite::SqliteStore;
use crate::storage::traits::{CrawlFleetRegistry, StorageResult};
use crate::storage::{CrawlServer, NewCrawlServer};
use rusqlite::params;

impl CrawlFleetRegistry for SqliteStore {
    fn register_server(&self, server: &NewCrawlServer) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO CrawlServer (url, name, slots, token) VALUES (?1, ?2, ?3, ?4)",
            params![server.url, server.name, server.slots, server.token],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(server_id = id, name = %server.name, slots = server.slots, "registered crawl server");
        Ok(id)
    }

    fn unregister_server(&self, server_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM CrawlServer WHERE id = ?1", params![server_id])?;
        tracing::info!(server_id, "unregistered crawl server");
        Ok(())
    }

    fn list_servers(&self) -> StorageResult<Vec<CrawlServer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, url, name, slots, token FROM CrawlServer ORDER BY id")?;

        let servers = stmt
            .query_map([], |row| {
                Ok(CrawlServer {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    name: row.get(2)?,
                    slots: row.get(3)?,
                    token: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(servers)
    }

    fn update_server(
        &self,
        server_id: i64,
        url: &str,
        name: &str,
        slots: u32,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE CrawlServer SET url = ?1, name = ?2, slots = ?3 WHERE id = ?4",
            params![url, name, slots, server_id],
        )?;
        Ok(())
    }
}
