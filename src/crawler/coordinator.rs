//! Crawl coordinator - the crawl orchestration loop
//!
//! This module owns everything that changes during a run:
//! - The frontier and visited set
//! - The accumulated page results, in visit order
//! - The run state and failure counters
//!
//! The loop is sequential. One page is rendered and extracted at a time,
//! and cancellation is observed between and during pages.

use crate::config::{CrawlConfig, CrawlSettings};
use crate::crawler::events::{CrawlEvent, EventSink};
use crate::crawler::frontier::Frontier;
use crate::crawler::result::PageResult;
use crate::extract::{self, ExtractError, DEFAULT_SELECTOR};
use crate::output::CrawlSummary;
use crate::render::{PageRenderer, RenderError, RenderOptions, RenderedPage};
use crate::state::RunState;
use crate::url::{is_valid_url, normalize, scope_for_seed, ScopeMatcher};
use crate::{HarvestError, Result};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Why a single page was skipped
#[derive(Debug, Error)]
enum PageFault {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Everything a finished run hands back
#[derive(Debug)]
pub struct CrawlOutcome {
    /// `Completed` or `Aborted`
    pub state: RunState,

    /// Captured pages in dequeue order
    pub pages: Vec<PageResult>,

    pub summary: CrawlSummary,

    /// Set if the renderer could not be released cleanly
    pub release_error: Option<RenderError>,
}

/// Validates a seed URL and returns the form that is enqueued
///
/// The seed is kept as written unless it carries a fragment, in which case
/// the fragment is stripped.
///
/// # Errors
///
/// `HarvestError::InvalidSeed` unless the seed is an absolute URL with a host.
pub fn prepare_seed(seed: &str) -> Result<String> {
    let seed = seed.trim();
    if !is_valid_url(seed) {
        return Err(HarvestError::InvalidSeed(seed.to_string()));
    }
    if seed.contains('#') {
        Ok(normalize(seed, seed))
    } else {
        Ok(seed.to_string())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: String,
    selector: String,
    max_pages: usize,
    matcher: ScopeMatcher,
    render_options: RenderOptions,
    selector_timeout: Duration,
    renderer: Box<dyn PageRenderer>,
    frontier: Frontier,
    pages: Vec<PageResult>,
    state: RunState,
    failed: usize,
    duplicates: usize,
    events: EventSink,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL
    /// * `config` - Crawl and renderer settings
    /// * `renderer` - An acquired renderer; the coordinator shuts it down
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, in state `Idle`
    /// * `Err(HarvestError)` - Invalid seed, scope pattern, or selector
    pub fn new(seed: &str, config: &CrawlConfig, renderer: Box<dyn PageRenderer>) -> Result<Self> {
        let CrawlSettings {
            selector,
            max_pages,
            pattern,
            ..
        } = &config.crawl;

        let seed = prepare_seed(seed)?;
        let matcher = scope_for_seed(&seed, pattern.as_deref())?;

        let selector = match selector.trim() {
            "" => DEFAULT_SELECTOR.to_string(),
            s => s.to_string(),
        };
        extract::parse_selector(&selector)
            .map_err(|e| crate::ConfigError::Validation(e.to_string()))?;

        if *max_pages < 1 {
            return Err(crate::ConfigError::Validation("max-pages must be >= 1".to_string()).into());
        }

        Ok(Self {
            frontier: Frontier::with_seed(&seed),
            seed,
            selector,
            max_pages: *max_pages,
            matcher,
            render_options: RenderOptions {
                wait_until: config.renderer.wait_until,
                navigation_timeout: Duration::from_millis(config.renderer.navigation_timeout_ms),
            },
            selector_timeout: Duration::from_millis(config.renderer.selector_timeout_ms),
            renderer,
            pages: Vec::new(),
            state: RunState::Idle,
            failed: 0,
            duplicates: 0,
            events: EventSink::default(),
        })
    }

    /// Sends progress events to `sender` during the run
    pub fn with_events(mut self, sender: UnboundedSender<CrawlEvent>) -> Self {
        self.events = EventSink::new(Some(sender));
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn scope(&self) -> &ScopeMatcher {
        &self.matcher
    }

    /// Runs the crawl loop until the frontier drains, the budget is reached,
    /// or `cancel` fires
    ///
    /// The renderer is shut down before returning on every path. Pages
    /// captured before a cancellation are returned, not discarded.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<CrawlOutcome> {
        self.state.transition(RunState::Running)?;
        info!(
            "Starting crawl of {} (budget {}, scope {}, renderer {})",
            self.seed,
            self.max_pages,
            self.matcher.pattern(),
            self.renderer.name()
        );
        self.events.emit(CrawlEvent::Started {
            seed: self.seed.clone(),
            max_pages: self.max_pages,
        });

        let start_time = Instant::now();

        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = self.crawl_loop() => false,
        };

        let release_error = match self.renderer.shutdown().await {
            Ok(()) => None,
            Err(e) => {
                error!("Failed to release renderer: {}", e);
                Some(e)
            }
        };

        let final_state = if cancelled {
            warn!(
                "Crawl cancelled, keeping {} captured pages",
                self.pages.len()
            );
            RunState::Aborted
        } else {
            RunState::Completed
        };
        self.state.transition(final_state)?;

        let summary = CrawlSummary {
            seed: self.seed.clone(),
            state: self.state,
            pages_captured: self.pages.len(),
            pages_failed: self.failed,
            duplicates_skipped: self.duplicates,
            frontier_remaining: self.frontier.len(),
            visited: self.frontier.visited_count(),
            max_pages: self.max_pages,
            elapsed: start_time.elapsed(),
        };

        info!(
            "Crawl {}: {} pages captured, {} failed, {} left in frontier",
            self.state, summary.pages_captured, summary.pages_failed, summary.frontier_remaining
        );
        self.events.emit(CrawlEvent::Finished {
            state: self.state,
            captured: self.pages.len(),
            failed: self.failed,
        });

        Ok(CrawlOutcome {
            state: self.state,
            pages: self.pages,
            summary,
            release_error,
        })
    }

    async fn crawl_loop(&mut self) {
        while self.pages.len() < self.max_pages {
            let Some(url) = self.frontier.pop() else {
                debug!("Frontier is empty");
                break;
            };

            // Marked before rendering so a failing page is never retried
            if !self.frontier.mark_visited(&url) {
                self.duplicates += 1;
                debug!("Skipping {}: already visited", url);
                continue;
            }

            match self.capture(&url).await {
                Ok(page) => self.record(page),
                Err(fault) => {
                    self.failed += 1;
                    warn!("Skipping {}: {}", url, fault);
                    self.events.emit(CrawlEvent::PageFailed {
                        url,
                        reason: fault.to_string(),
                    });
                }
            }
        }
    }

    /// Renders and extracts one page
    async fn capture(&self, url: &str) -> std::result::Result<PageResult, PageFault> {
        debug!("Rendering {}", url);
        let mut page = self.renderer.open(url, &self.render_options).await?;

        let html = self.read_document(page.as_mut()).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page {}: {}", url, e);
        }
        let html = html?;

        let extraction = extract::process(&html, url, &self.selector)?;
        Ok(PageResult::new(url, html, extraction))
    }

    /// Waits for the content selector, then reads the document either way
    async fn read_document(&self, page: &mut dyn RenderedPage) -> std::result::Result<String, RenderError> {
        if let Err(e) = page
            .wait_for_selector(&self.selector, self.selector_timeout)
            .await
        {
            debug!("{}; extracting the document as it is", e);
        }
        page.content().await
    }

    fn record(&mut self, page: PageResult) {
        let url = page.url.clone();
        let links: Vec<String> = page
            .links
            .internal
            .iter()
            .map(|link| link.href.clone())
            .collect();

        self.events.emit(CrawlEvent::PageCaptured {
            url: url.clone(),
            title: page.title.clone(),
            captured: self.pages.len() + 1,
            max_pages: self.max_pages,
        });
        self.pages.push(page);
        info!("Captured {} ({}/{})", url, self.pages.len(), self.max_pages);

        if self.pages.len() < self.max_pages {
            self.enqueue_links(&url, &links);
        }
    }

    /// Enqueues in-scope links not yet visited or queued, in document order
    fn enqueue_links(&mut self, from: &str, links: &[String]) {
        let mut added = 0;

        for href in links {
            if !self.matcher.test(href) {
                trace!("Out of scope: {}", href);
                continue;
            }
            if !self.frontier.push(href) {
                trace!("Already seen: {}", href);
                continue;
            }
            added += 1;
            self.events.emit(CrawlEvent::Enqueued {
                url: href.clone(),
                from: from.to_string(),
            });
        }

        debug!(
            "{} of {} links from {} enqueued ({} in frontier)",
            added,
            links.len(),
            from,
            self.frontier.len()
        );
    }
}
