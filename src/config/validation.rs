use crate::config::types::{CrawlConfig, CrawlSettings, RendererConfig};
use crate::extract::parse_selector;
use crate::url::compile_matcher;
use crate::ConfigError;

/// Lowest accepted timeout, in milliseconds
const MIN_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_renderer_config(&config.renderer)?;
    Ok(())
}

fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            settings.max_pages
        )));
    }

    if !settings.selector.trim().is_empty() {
        parse_selector(settings.selector.trim())
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
    }

    if let Some(pattern) = &settings.pattern {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Scope pattern cannot be empty".to_string(),
            ));
        }
        compile_matcher(pattern.trim()).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
    }

    Ok(())
}

fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.navigation_timeout_ms
        )));
    }

    if config.selector_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "selector-timeout-ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.selector_timeout_ms
        )));
    }

    if let Some(ua) = &config.user_agent {
        if ua.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
