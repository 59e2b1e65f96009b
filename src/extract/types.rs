//! Value types produced by content extraction

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can surface from extraction
///
/// Missing or malformed optional data never produces an error; only a
/// document that cannot be treated as HTML at all does.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document for {url} is not parsable: {reason}")]
    Unparsable { url: String, reason: String },

    #[error("Invalid content selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute href with the fragment removed (raw href if it could not be resolved)
    pub href: String,

    /// Visible anchor text, trimmed
    pub text: String,

    /// The anchor's `title` attribute, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Discriminates media items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// An image or video referenced by a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Absolute source URL
    pub src: String,

    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// Alt text (images only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Links split by whether they stay on the page's base domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBuckets {
    pub internal: Vec<Link>,
    pub external: Vec<Link>,
}

impl LinkBuckets {
    /// Total number of links in both buckets
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    /// Returns true if no links were found
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// Media split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBuckets {
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
}

/// Everything extracted from one rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Text of the document's `<title>` element, trimmed (empty if absent)
    pub title: String,

    /// Serialized markup of the selected region after sanitization
    pub html: String,

    /// Markdown rendering of the sanitized region
    pub markdown: String,

    /// Plain-text content of the sanitized region, trimmed
    pub text: String,

    pub links: LinkBuckets,

    pub media: MediaBuckets,

    /// Meta tag name/property to content, plus `title`
    pub metadata: BTreeMap<String, String>,
}
