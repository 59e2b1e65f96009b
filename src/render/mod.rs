//! Page rendering back-ends
//!
//! The crawler only talks to [`PageRenderer`] and [`RenderedPage`]. A
//! renderer is acquired once per run, opens one page at a time, and must be
//! shut down on every exit path.

mod chrome;
mod http;

pub use chrome::ChromeRenderer;
pub use http::{build_http_client, HttpRenderer};

use crate::config::RendererConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors raised by a renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch renderer: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Selector '{selector}' did not appear within {timeout_ms}ms")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Could not read content of {url}: {reason}")]
    Content { url: String, reason: String },

    #[error("Failed to release renderer: {0}")]
    Close(String),

    #[error("Renderer is already shut down")]
    Closed,
}

impl RenderError {
    /// Returns true for faults of the renderer itself rather than of one page
    pub fn is_resource_fault(&self) -> bool {
        matches!(self, RenderError::Launch(_) | RenderError::Close(_) | RenderError::Closed)
    }
}

/// When navigation is considered finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    /// The load event fired
    Load,
    /// Navigation committed and the DOM was parsed
    #[value(name = "domcontentloaded")]
    DomContentLoaded,
    /// Load plus a settle period for late requests
    #[default]
    #[value(name = "networkidle")]
    NetworkIdle,
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WaitUntil::Load => "load",
            WaitUntil::DomContentLoaded => "domcontentloaded",
            WaitUntil::NetworkIdle => "networkidle",
        };
        write!(f, "{}", s)
    }
}

/// Which back-end renders pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium, executes JavaScript
    #[default]
    Chrome,
    /// Plain HTTP GET, static markup only
    Http,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Chrome => write!(f, "chrome"),
            RendererKind::Http => write!(f, "http"),
        }
    }
}

/// Per-navigation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub wait_until: WaitUntil,
    pub navigation_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wait_until: WaitUntil::default(),
            navigation_timeout: Duration::from_millis(30_000),
        }
    }
}

/// A page that finished navigating
#[async_trait]
pub trait RenderedPage: Send {
    /// Waits up to `timeout` for `selector` to match an element
    ///
    /// # Errors
    ///
    /// `RenderError::SelectorTimeout` if it never appears. Callers treat this
    /// as non-fatal.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Serialized markup of the current document
    async fn content(&mut self) -> Result<String, RenderError>;

    /// Releases the page; further calls are no-ops
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Something that can turn a URL into a [`RenderedPage`]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigates to `url`, bounded by `options.navigation_timeout`
    async fn open(&self, url: &str, options: &RenderOptions) -> Result<Box<dyn RenderedPage>, RenderError>;

    /// Releases the underlying session. Called exactly once at run end.
    async fn shutdown(&mut self) -> Result<(), RenderError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Acquires the renderer selected by `config`
///
/// # Errors
///
/// `RenderError::Launch` if the browser cannot be started or the HTTP client
/// cannot be built.
pub async fn launch(config: &RendererConfig) -> Result<Box<dyn PageRenderer>, RenderError> {
    info!("Starting {} renderer", config.kind);
    match config.kind {
        RendererKind::Chrome => Ok(Box::new(ChromeRenderer::launch(config).await?)),
        RendererKind::Http => Ok(Box::new(HttpRenderer::new(config)?)),
    }
}
