//! Static HTTP renderer
//!
//! Fetches markup with a plain GET. No JavaScript runs, so selector waits
//! resolve immediately against the downloaded document.

use super::{PageRenderer, RenderError, RenderOptions, RenderedPage};
use crate::config::RendererConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("webharvest/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used by [`HttpRenderer`]
///
/// # Arguments
///
/// * `config` - Renderer settings; the user agent and navigation timeout apply
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &RendererConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let client = build_http_client(config).map_err(|e| RenderError::Launch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn open(&self, url: &str, options: &RenderOptions) -> Result<Box<dyn RenderedPage>, RenderError> {
        let response = self
            .client
            .get(url)
            .timeout(options.navigation_timeout)
            .send()
            .await
            .map_err(|e| classify(url, options, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(RenderError::Content {
                url: url.to_string(),
                reason: format!("unsupported content type '{}'", content_type),
            });
        }

        let html = response.text().await.map_err(|e| classify(url, options, e))?;
        debug!("Fetched {} ({} bytes)", url, html.len());

        Ok(Box::new(HttpPage { html: Some(html), url: url.to_string() }))
    }

    async fn shutdown(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn classify(url: &str, options: &RenderOptions, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
            timeout_ms: options.navigation_timeout.as_millis() as u64,
        }
    } else if error.is_connect() {
        RenderError::Navigation {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

struct HttpPage {
    html: Option<String>,
    url: String,
}

impl HttpPage {
    fn html(&self) -> Result<&str, RenderError> {
        self.html.as_deref().ok_or_else(|| RenderError::Content {
            url: self.url.clone(),
            reason: "page already closed".to_string(),
        })
    }
}

fn has_match(html: &str, selector: &str) -> bool {
    let Ok(selector) = Selector::parse(selector) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

#[async_trait]
impl RenderedPage for HttpPage {
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        if has_match(self.html()?, selector) {
            Ok(())
        } else {
            Err(RenderError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.html().map(str::to_string)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.html = None;
        Ok(())
    }
}
