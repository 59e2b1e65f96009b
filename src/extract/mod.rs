//! Content extraction from rendered pages
//!
//! [`process`] is a pure transform from markup to an [`ExtractionResult`].
//! The document is parsed once; noise is detected once and then skipped by
//! every pass (links, media, region markup, text) without mutating the tree.

mod links;
mod markdown;
mod media;
mod metadata;
mod noise;
mod sanitize;
mod types;

pub use links::extract_links;
pub use markdown::to_markdown;
pub use media::extract_media;
pub use metadata::{extract_metadata, extract_title};
pub use noise::NoiseSet;
pub use sanitize::{regions_text, select_regions, serialize_regions, ALLOWED_ATTRIBUTES};
pub use types::{
    ExtractError, ExtractionResult, Link, LinkBuckets, MediaBuckets, MediaItem, MediaKind,
};

use scraper::{Html, Selector};
use tracing::trace;

/// Selector used when the caller passes an empty one
pub const DEFAULT_SELECTOR: &str = "body";

/// Extracts title, metadata, links, media and the sanitized content region
///
/// # Arguments
///
/// * `html` - Full markup of the rendered page
/// * `page_url` - URL the page was rendered from; base for link resolution
/// * `selector` - CSS selector of the content region (empty means `body`)
///
/// # Errors
///
/// * `ExtractError::Unparsable` if the markup is empty
/// * `ExtractError::InvalidSelector` if `selector` is not valid CSS
///
/// A selector matching nothing is not an error: the region fields are then
/// empty while links, media and metadata are still filled in.
pub fn process(html: &str, page_url: &str, selector: &str) -> Result<ExtractionResult, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::Unparsable {
            url: page_url.to_string(),
            reason: "document is empty".to_string(),
        });
    }

    let selector = if selector.trim().is_empty() {
        DEFAULT_SELECTOR
    } else {
        selector.trim()
    };
    let region_selector = parse_selector(selector)?;

    let document = Html::parse_document(html);
    let noise = NoiseSet::detect(&document);
    trace!("{}: {} noise regions", page_url, noise.len());

    let title = extract_title(&document);
    let metadata = extract_metadata(&document, &title);
    let links = extract_links(&document, &noise, page_url);
    let media = extract_media(&document, &noise, page_url);

    let regions = select_regions(&document, &region_selector, &noise);
    let sanitized = serialize_regions(&regions, &noise, true);
    let text = regions_text(&regions, &noise);
    let markdown = to_markdown(&serialize_regions(&regions, &noise, false), &text);

    Ok(ExtractionResult {
        title,
        html: sanitized,
        markdown,
        text,
        links,
        media,
        metadata,
    })
}

/// Parses a CSS selector, mapping failure to [`ExtractError::InvalidSelector`]
pub fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
