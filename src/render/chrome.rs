//! Headless Chromium renderer
//!
//! One browser process per run. The CDP handler runs on a tracked task that
//! is aborted on shutdown, and each crawled URL gets its own tab which is
//! closed once its content has been read.

use super::{PageRenderer, RenderError, RenderOptions, RenderedPage, WaitUntil};
use crate::config::RendererConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Extra wait after the load event for `networkidle`
const NETWORK_SETTLE: Duration = Duration::from_millis(500);

/// Polling interval while waiting for a selector
const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Launch flags that keep heavy sub-resources from loading
const BLOCKING_ARGS: &[&str] = &[
    "--blink-settings=imagesEnabled=false",
    "--disable-remote-fonts",
    "--autoplay-policy=user-gesture-required",
];

const BASE_ARGS: &[&str] = &[
    "--disable-extensions",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--no-first-run",
    "--no-default-browser-check",
    "--mute-audio",
    "--hide-scrollbars",
];

pub struct ChromeRenderer {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: PathBuf,
}

impl ChromeRenderer {
    /// Launches a browser configured from `config`
    ///
    /// # Errors
    ///
    /// `RenderError::Launch` if the profile directory cannot be created, the
    /// launch configuration is rejected, or the browser process fails to start.
    pub async fn launch(config: &RendererConfig) -> Result<Self, RenderError> {
        let user_data_dir =
            std::env::temp_dir().join(format!("webharvest-chrome-{}", std::process::id()));
        tokio::fs::create_dir_all(&user_data_dir)
            .await
            .map_err(|e| RenderError::Launch(format!("profile directory: {}", e)))?;

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms))
            .window_size(1366, 900)
            .user_data_dir(user_data_dir.clone());

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if let Some(ua) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }
        for arg in BASE_ARGS {
            builder = builder.arg(*arg);
        }
        if config.block_resources {
            for arg in BLOCKING_ARGS {
                builder = builder.arg(*arg);
            }
        }

        let launched = match builder.build() {
            Ok(browser_config) => Browser::launch(browser_config)
                .await
                .map_err(|e| RenderError::Launch(e.to_string())),
            Err(e) => Err(RenderError::Launch(e)),
        };
        let (browser, mut handler) = match launched {
            Ok(launched) => launched,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&user_data_dir).await {
                    debug!("Could not remove profile directory: {}", cleanup);
                }
                return Err(e);
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
            debug!("Browser event handler finished");
        });

        info!(
            "Browser launched (headless: {}, blocking resources: {})",
            config.headless, config.block_resources
        );

        Ok(Self {
            browser: Some(browser),
            handler: Some(handler_task),
            user_data_dir,
        })
    }
}

/// Navigates `page` and waits according to `wait_until`
async fn navigate(page: &Page, url: &str, wait_until: WaitUntil) -> chromiumoxide::error::Result<()> {
    page.goto(url).await?;
    match wait_until {
        WaitUntil::DomContentLoaded => {}
        WaitUntil::Load => {
            page.wait_for_navigation().await?;
        }
        WaitUntil::NetworkIdle => {
            page.wait_for_navigation().await?;
            tokio::time::sleep(NETWORK_SETTLE).await;
        }
    }
    Ok(())
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn open(&self, url: &str, options: &RenderOptions) -> Result<Box<dyn RenderedPage>, RenderError> {
        let browser = self.browser.as_ref().ok_or(RenderError::Closed)?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                reason: format!("could not open tab: {}", e),
            })?;

        let outcome = tokio::time::timeout(
            options.navigation_timeout,
            navigate(&page, url, options.wait_until),
        )
        .await;

        let failure = match outcome {
            Ok(Ok(())) => {
                return Ok(Box::new(ChromePage {
                    page: Some(page),
                    url: url.to_string(),
                }))
            }
            Ok(Err(e)) => RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            },
            Err(_) => RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: options.navigation_timeout.as_millis() as u64,
            },
        };

        if let Err(e) = page.close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }
        Err(failure)
    }

    async fn shutdown(&mut self) -> Result<(), RenderError> {
        let mut result = Ok(());

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                result = Err(RenderError::Close(e.to_string()));
            }
            if let Err(e) = browser.wait().await {
                debug!("Browser process wait failed: {}", e);
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
            debug!(
                "Could not remove profile directory {}: {}",
                self.user_data_dir.display(),
                e
            );
        }

        info!("Browser closed");
        result
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            warn!("Browser dropped without shutdown");
            handler.abort();
        }
    }
}

/// Re-runs `check` until it reports a match or `timeout` elapses
///
/// The deadline also covers a single check that never returns.
async fn poll_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let poll = async move {
        while !check().await {
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    };
    tokio::time::timeout(timeout, poll).await.is_ok()
}

struct ChromePage {
    page: Option<Page>,
    url: String,
}

impl ChromePage {
    fn page(&self) -> Result<&Page, RenderError> {
        self.page.as_ref().ok_or_else(|| RenderError::Content {
            url: self.url.clone(),
            reason: "page already closed".to_string(),
        })
    }
}

#[async_trait]
impl RenderedPage for ChromePage {
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        let page = self.page()?;
        let start = Instant::now();

        let found = poll_until(timeout, move || async move { page.find_element(selector).await.is_ok() }).await;

        if found {
            debug!("'{}' present on {} after {:?}", selector, self.url, start.elapsed());
            Ok(())
        } else {
            Err(RenderError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        let page = self.page()?;
        page.content().await.map_err(|e| RenderError::Content {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        match self.page.take() {
            Some(page) => page
                .close()
                .await
                .map_err(|e| RenderError::Close(format!("tab for {}: {}", self.url, e))),
            None => Ok(()),
        }
    }
}
