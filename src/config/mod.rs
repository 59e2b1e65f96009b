//! Configuration for a crawl run
//!
//! Settings come from built-in defaults, an optional TOML file, and command
//! line overrides, in that order of increasing precedence.
//!
//! # Example
//!
//! ```no_run
//! use webharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Rendering with: {}", config.renderer.kind);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{CliOverrides, CrawlConfig, CrawlSettings, OutputFormat, RendererConfig};

pub use parser::{load_config, parse_config};
pub use validation::validate;
