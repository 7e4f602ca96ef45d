use crate::config::types::{Config, CrawlConfig, DatabaseConfig};
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_database_config(&config.database)?;
    validate_crawl_config(&config.crawl)?;
    Ok(())
}

/// Validates metadata store configuration
fn validate_database_config(config: &DatabaseConfig) -> ConfigResult<()> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    if config.pool_size < 1 || config.pool_size > 64 {
        return Err(ConfigError::Validation(format!(
            "pool-size must be between 1 and 64, got {}",
            config.pool_size
        )));
    }

    Ok(())
}

/// Validates crawl scheduling configuration
fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    if config.recrawl_interval_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "recrawl-interval-hours must be >= 1, got {}",
            config.recrawl_interval_hours
        )));
    }

    Ok(())
}
