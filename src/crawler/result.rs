//! Per-page result record

use crate::extract::{ExtractionResult, LinkBuckets, MediaBuckets};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One successfully captured page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// URL as it was dequeued
    pub url: String,

    pub title: String,

    /// Markup exactly as the renderer returned it
    pub html: String,

    /// Selected region with noise removed and attributes stripped
    pub sanitized_html: String,

    pub markdown: String,

    pub text: String,

    pub links: LinkBuckets,

    pub media: MediaBuckets,

    pub metadata: BTreeMap<String, String>,

    /// When extraction finished
    pub timestamp: DateTime<Utc>,
}

impl PageResult {
    /// Builds the record for `url` from its raw markup and extraction output
    pub fn new(url: &str, html: String, extraction: ExtractionResult) -> Self {
        Self {
            url: url.to_string(),
            title: extraction.title,
            html,
            sanitized_html: extraction.html,
            markdown: extraction.markdown,
            text: extraction.text,
            links: extraction.links,
            media: extraction.media,
            metadata: extraction.metadata,
            timestamp: Utc::now(),
        }
    }
}
