//! Crawler module for the crawl orchestration loop
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier and visited set
//! - Progress events for callers
//! - Per-page result records
//! - Overall crawl coordination

mod coordinator;
mod events;
mod frontier;
mod result;

pub use coordinator::{prepare_seed, Coordinator, CrawlOutcome};
pub use events::CrawlEvent;
pub use frontier::Frontier;
pub use result::PageResult;

use crate::config::{validate, CrawlConfig};
use crate::url::scope_for_seed;
use crate::{render, HarvestError, Result};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and the seed URL
/// 2. Acquire the configured renderer
/// 3. Crawl breadth-first until the frontier drains, the budget is reached,
///    or `cancel` fires
/// 4. Release the renderer
///
/// Nothing is rendered unless steps 1 and 2 succeed.
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The crawl configuration
/// * `cancel` - Cancels the run; captured pages are still returned
/// * `events` - Optional progress channel
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The run finished, completed or aborted
/// * `Err(HarvestError)` - Invalid input or the renderer could not be acquired
pub async fn run_crawl(
    seed: &str,
    config: &CrawlConfig,
    cancel: CancellationToken,
    events: Option<UnboundedSender<CrawlEvent>>,
) -> Result<CrawlOutcome> {
    validate(config)?;
    let seed = prepare_seed(seed)?;
    scope_for_seed(&seed, config.crawl.pattern.as_deref())?;

    let renderer = render::launch(&config.renderer)
        .await
        .map_err(HarvestError::Resource)?;

    let mut coordinator = Coordinator::new(&seed, config, renderer)?;
    if let Some(sender) = events {
        coordinator = coordinator.with_events(sender);
    }
    coordinator.run(cancel).await
}
