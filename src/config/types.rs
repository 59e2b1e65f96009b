use crate::render::{RendererKind, WaitUntil};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlConfig {
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// What to crawl and where results go
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CrawlSettings {
    /// CSS selector of the content region on each page
    pub selector: String,

    /// Page budget, counted in successfully captured pages
    pub max_pages: usize,

    /// Scope glob; defaults to everything under the seed path
    pub pattern: Option<String>,

    pub format: OutputFormat,

    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            selector: "body".to_string(),
            max_pages: 10,
            pattern: None,
            format: OutputFormat::default(),
            output: None,
        }
    }
}

/// Renderer back-end settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RendererConfig {
    pub kind: RendererKind,

    /// Run the browser without a window
    pub headless: bool,

    /// Upper bound on navigation and load (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Upper bound on waiting for the content selector (milliseconds)
    pub selector_timeout_ms: u64,

    pub wait_until: WaitUntil,

    /// Skip images, remote fonts and autoplaying media
    pub block_resources: bool,

    pub user_agent: Option<String>,

    /// Browser binary; auto-detected when absent
    pub chrome_executable: Option<PathBuf>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::default(),
            headless: true,
            navigation_timeout_ms: 30_000,
            selector_timeout_ms: 5_000,
            wait_until: WaitUntil::default(),
            block_resources: true,
            user_agent: None,
            chrome_executable: None,
        }
    }
}

/// Serialization used for the result file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every field of every page, as a JSON array
    #[default]
    Json,
    /// One Markdown document per page, separated by rules
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Values given on the command line; each one set replaces the file value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub selector: Option<String>,
    pub max_pages: Option<usize>,
    pub pattern: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub renderer: Option<RendererKind>,
    pub headful: bool,
    pub navigation_timeout_ms: Option<u64>,
    pub selector_timeout_ms: Option<u64>,
    pub wait_until: Option<WaitUntil>,
    pub no_block_resources: bool,
}

impl CliOverrides {
    /// Merges these overrides into `config`
    pub fn apply(self, config: &mut CrawlConfig) {
        let crawl = &mut config.crawl;
        if let Some(selector) = self.selector {
            crawl.selector = selector;
        }
        if let Some(max_pages) = self.max_pages {
            crawl.max_pages = max_pages;
        }
        if self.pattern.is_some() {
            crawl.pattern = self.pattern;
        }
        if let Some(format) = self.format {
            crawl.format = format;
        }
        if self.output.is_some() {
            crawl.output = self.output;
        }

        let renderer = &mut config.renderer;
        if let Some(kind) = self.renderer {
            renderer.kind = kind;
        }
        if self.headful {
            renderer.headless = false;
        }
        if let Some(ms) = self.navigation_timeout_ms {
            renderer.navigation_timeout_ms = ms;
        }
        if let Some(ms) = self.selector_timeout_ms {
            renderer.selector_timeout_ms = ms;
        }
        if let Some(wait_until) = self.wait_until {
            renderer.wait_until = wait_until;
        }
        if self.no_block_resources {
            renderer.block_resources = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.crawl.selector, "body");
        assert_eq!(config.crawl.max_pages, 10);
        assert_eq!(config.crawl.format, OutputFormat::Json);
        assert!(config.crawl.pattern.is_none());
        assert_eq!(config.renderer.kind, RendererKind::Chrome);
        assert!(config.renderer.headless);
        assert!(config.renderer.block_resources);
        assert_eq!(config.renderer.navigation_timeout_ms, 30_000);
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut config = CrawlConfig::default();
        config.crawl.pattern = Some("https://ex.com/docs/**".into());

        CliOverrides {
            max_pages: Some(3),
            format: Some(OutputFormat::Markdown),
            renderer: Some(RendererKind::Http),
            headful: true,
            ..CliOverrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.crawl.max_pages, 3);
        assert_eq!(config.crawl.format, OutputFormat::Markdown);
        assert_eq!(config.crawl.selector, "body");
        assert_eq!(config.crawl.pattern.as_deref(), Some("https://ex.com/docs/**"));
        assert_eq!(config.renderer.kind, RendererKind::Http);
        assert!(!config.renderer.headless);
        assert!(config.renderer.block_resources);
    }
}
