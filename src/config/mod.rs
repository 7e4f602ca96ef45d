//! Configuration module for Crawl-Ledger
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawl_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ledger.toml")).unwrap();
//! println!("Ledger database: {}", config.database.path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, DatabaseConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
