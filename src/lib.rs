//! Webharvest: a bounded, scope-limited recursive web crawler
//!
//! This crate renders pages in a browser engine, extracts structured content
//! (text, links, media, metadata), converts it to markdown, and follows
//! same-scope links breadth-first until a page budget is exhausted.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod render;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Webharvest operations
///
/// Only run-level faults surface through this type. Per-page render and
/// extraction faults are recovered inside the crawl loop.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Renderer resource error: {0}")]
    Resource(render::RenderError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

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

    #[error("Invalid scope pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Invalid scope pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}

/// Result type alias for Webharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{run_crawl, Coordinator, CrawlEvent, CrawlOutcome, PageResult};
pub use extract::{process, ExtractionResult, Link, MediaItem};
pub use state::RunState;
pub use url::{base_domain, compile_matcher, is_external, is_valid_url, normalize, ScopeMatcher};
