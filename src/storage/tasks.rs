//! Task result log backed by the `TaskResult` table
//!
//! The log is append-only. Per-server statistics are derived from the same
//! joined view that `list_results` returns, so a server or website that has
//! been deleted drops out of both.

use crate::storage::sqlite::{
    optional_timestamp_column, row_exists, timestamp_column, to_db_timestamp, SqliteStore,
};
use crate::storage::traits::{StorageError, StorageResult, TaskResultLog};
use crate::storage::{ServerStats, TaskResult};
use rusqlite::params;
use std::collections::HashMap;

impl TaskResultLog for SqliteStore {
    fn append_result(&self, result: &TaskResult) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if !row_exists(&tx, "CrawlServer", result.server_id)? {
            return Err(StorageError::ConstraintViolation(format!(
                "crawl server {} is not registered",
                result.server_id
            )));
        }

        if !row_exists(&tx, "Website", result.website_id)? {
            return Err(StorageError::ConstraintViolation(format!(
                "website {} does not exist",
                result.website_id
            )));
        }

        tx.execute(
            "INSERT INTO TaskResult
             (server, website_id, status_code, file_count, start_time, end_time, indexed_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                result.server_id,
                result.website_id,
                result.status_code,
                result.file_count,
                to_db_timestamp(&result.start_time),
                to_db_timestamp(&result.end_time),
                result.indexed_time.as_ref().map(to_db_timestamp),
            ],
        )?;
        tx.commit()?;

        tracing::debug!(
            server_id = result.server_id,
            website_id = result.website_id,
            file_count = result.file_count,
            "logged task result"
        );
        Ok(())
    }

    fn list_results(&self) -> StorageResult<Vec<TaskResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT T.server, T.website_id, T.status_code, T.file_count,
                    T.start_time, T.end_time, T.indexed_time, S.name
             FROM TaskResult T
             INNER JOIN CrawlServer S ON T.server = S.id
             INNER JOIN Website W ON T.website_id = W.id
             ORDER BY T.end_time DESC, T.id DESC",
        )?;

        let results = stmt
            .query_map([], |row| {
                Ok(TaskResult {
                    server_id: row.get(0)?,
                    website_id: row.get(1)?,
                    status_code: row.get(2)?,
                    file_count: row.get(3)?,
                    start_time: timestamp_column(row, 4)?,
                    end_time: timestamp_column(row, 5)?,
                    indexed_time: optional_timestamp_column(row, 6)?,
                    server_name: Some(row.get(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    fn stats_by_server(&self) -> StorageResult<HashMap<String, ServerStats>> {
        Ok(aggregate_by_server(&self.list_results()?))
    }
}

/// Sums task results per server name and computes the averages
///
/// Averages are true division over the number of tasks.
fn aggregate_by_server(results: &[TaskResult]) -> HashMap<String, ServerStats> {
    let mut stats: HashMap<String, ServerStats> = HashMap::new();

    for result in results {
        let Some(name) = &result.server_name else {
            continue;
        };

        let entry = stats.entry(name.clone()).or_default();
        entry.task_count += 1;
        entry.file_count += result.file_count;
        entry.time += result.duration_secs();
    }

    for entry in stats.values_mut() {
        let tasks = entry.task_count as f64;
        entry.time_avg = entry.time / tasks;
        entry.file_count_avg = entry.file_count as f64 / tasks;
    }

    stats
}
