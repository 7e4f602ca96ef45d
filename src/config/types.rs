use serde::Deserialize;

/// Main configuration structure for Crawl-Ledger
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

/// Metadata store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,

    /// Maximum number of pooled connections
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: u32,

    /// How long a statement waits on a locked database (milliseconds)
    #[serde(rename = "busy-timeout-ms", default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Crawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Websites untouched for longer than this are due for a re-crawl
    #[serde(
        rename = "recrawl-interval-hours",
        default = "default_recrawl_interval_hours"
    )]
    pub recrawl_interval_hours: u32,
}

impl CrawlConfig {
    /// The re-crawl interval as a duration
    pub fn recrawl_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.recrawl_interval_hours))
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            recrawl_interval_hours: default_recrawl_interval_hours(),
        }
    }
}

fn default_pool_size() -> u32 {
    8
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_recrawl_interval_hours() -> u32 {
    24 * 7
}
