use crate::config::types::{Config, CrawlerConfig, EmbeddingConfig, StorageConfig};
use crate::ConfigError;
use regex::Regex;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_embedding_config(&config.embedding)?;
    validate_blacklist(&config.blacklist)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 128 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 128, got {}",
            config.workers
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch-timeout-ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    if config.max_queue_size < 1 {
        return Err(ConfigError::Validation(
            "max-queue-size must be >= 1".to_string(),
        ));
    }

    if config.max_visited_size < 1 {
        return Err(ConfigError::Validation(
            "max-visited-size must be >= 1".to_string(),
        ));
    }

    if config.max_domain_visits < 1 {
        return Err(ConfigError::Validation(
            "max-domain-visits must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates embedding configuration
fn validate_embedding_config(config: &EmbeddingConfig) -> Result<(), ConfigError> {
    if config.enabled && config.vectors_path.is_empty() {
        return Err(ConfigError::Validation(
            "vectors-path cannot be empty when embedding is enabled".to_string(),
        ));
    }
    Ok(())
}

/// Validates that every blacklist pattern compiles as a regex
fn validate_blacklist(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}
