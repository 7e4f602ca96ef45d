//! Crawl-Ledger: metadata and coordination layer for a distributed crawl/search service
//!
//! This crate owns the canonical record of discovered websites, the origin
//! blacklist, the fleet of remote crawl servers and the log of task results
//! they report. It also joins search-index results back against the website
//! registry.

pub mod config;
pub mod enrichment;
pub mod intake;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Crawl-Ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Result type alias for Crawl-Ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use enrichment::{SearchEnrichment, DELETED_WEBSITE};
pub use intake::{submit_website, Submission};
pub use storage::{SqliteStore, StorageError, StorageResult};
pub use crate::url::origin_of;
