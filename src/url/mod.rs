//! URL handling module for Crawl-Ledger
//!
//! This module reduces candidate URLs to their origin (scheme + authority),
//! which is the unit the blacklist operates on.

mod origin;

// Re-export main functions
pub use origin::origin_of;
