//! Integration tests for the metadata store
//!
//! These tests run against on-disk databases in temporary directories and
//! exercise the store the way the CLI and the search frontend use it.

mod enrichment_tests;
mod registry_tests;
mod task_log_tests;

use crawl_ledger::storage::{NewCrawlServer, SqliteStore};
use tempfile::TempDir;

/// Opens a fresh store in its own temporary directory
///
/// The directory must outlive the store, so both are returned.
pub fn temp_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = SqliteStore::open(&dir.path().join("ledger.db")).expect("Failed to open store");
    (dir, store)
}

pub fn crawl_server(name: &str, slots: u32) -> NewCrawlServer {
    NewCrawlServer {
        url: format!("http://{}.internal:8080", name),
        name: name.to_string(),
        slots,
        token: format!("{}-token", name),
    }
}
