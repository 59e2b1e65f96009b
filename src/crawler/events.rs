//! Progress events emitted by the crawl loop
//!
//! The library never prints. Callers that want progress pass a channel
//! sender and render events however they like.

use crate::state::RunState;
use tokio::sync::mpsc::UnboundedSender;

/// A notable step in a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// The loop started with `seed`
    Started { seed: String, max_pages: usize },

    /// A page was rendered and extracted
    PageCaptured {
        url: String,
        title: String,
        captured: usize,
        max_pages: usize,
    },

    /// A page was skipped after a render or extraction fault
    PageFailed { url: String, reason: String },

    /// A discovered link was added to the frontier
    Enqueued { url: String, from: String },

    /// The loop ended
    Finished {
        state: RunState,
        captured: usize,
        failed: usize,
    },
}

/// Optional sender wrapper; sending never fails the crawl
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<UnboundedSender<CrawlEvent>>,
}

impl EventSink {
    pub(crate) fn new(sender: Option<UnboundedSender<CrawlEvent>>) -> Self {
        Self { sender }
    }

    pub(crate) fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.sender {
            // receiver gone: nobody is listening
            let _ = sender.send(event);
        }
    }
}
