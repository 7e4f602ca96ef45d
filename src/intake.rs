//! Website intake
//!
//! Registering a newly discovered URL means checking the blacklist, checking
//! whether an existing crawl root already covers it, and inserting it. The
//! three steps run in one write transaction, so a blacklist entry added
//! concurrently cannot slip between the check and the insert.

use crate::storage::{blacklist, websites, SqliteStore, StorageResult};
use crate::url::origin_of;
use rusqlite::TransactionBehavior;

/// Outcome of submitting a URL to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The URL was stored as a new website
    Inserted(i64),
    /// A stored website's URL is a prefix of the submitted one
    AlreadyCovered(i64),
    /// The URL's origin is blacklisted; nothing was stored
    Blacklisted,
}

impl Submission {
    /// The ID of the website now covering the URL, if any
    pub fn website_id(&self) -> Option<i64> {
        match self {
            Self::Inserted(id) | Self::AlreadyCovered(id) => Some(*id),
            Self::Blacklisted => None,
        }
    }
}

/// Submits a discovered URL to the website registry
///
/// # Arguments
///
/// * `store` - The metadata store
/// * `url` - The discovered URL
/// * `logged_ip` - Address of the submitter, if known
/// * `logged_useragent` - User agent of the submitter, if known
///
/// # Returns
///
/// * `Ok(Submission)` - What happened to the URL
/// * `Err(StorageError::MalformedInput)` - The URL could not be parsed
/// * `Err(StorageError)` - The store could not be read or written
pub fn submit_website(
    store: &SqliteStore,
    url: &str,
    logged_ip: Option<&str>,
    logged_useragent: Option<&str>,
) -> StorageResult<Submission> {
    let origin = origin_of(url)?;

    let mut conn = store.conn()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if blacklist::origin_is_blacklisted(&tx, &origin)? {
        tracing::info!(url, origin = %origin, "rejected blacklisted submission");
        return Ok(Submission::Blacklisted);
    }

    if let Some(id) = websites::find_covering(&tx, url)? {
        tracing::debug!(url, website_id = id, "submission already covered");
        return Ok(Submission::AlreadyCovered(id));
    }

    let id = websites::insert_row(&tx, url, logged_ip, logged_useragent)?;
    tx.commit()?;

    tracing::info!(url, website_id = id, "registered new website");
    Ok(Submission::Inserted(id))
}
