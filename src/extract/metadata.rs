//! Page title and meta tag extraction
//!
//! Runs against the full document, before any noise filtering, so that
//! metadata inside `<header>` or other stripped regions is still captured.

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("TITLE: hardcoded selector is valid"));

static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("META: hardcoded selector is valid"));

/// Extracts the trimmed text of the first `<title>` element
///
/// Returns an empty string when the document has no title.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts meta tags into a name/property to content mapping
///
/// Only meta elements carrying both a `name` (or, failing that, a
/// `property`) and a `content` attribute are recorded. Later tags overwrite
/// earlier ones with the same key. The page title is stored under `title`
/// last, so it wins over a `<meta name="title">`.
pub fn extract_metadata(document: &Html, title: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for element in document.select(&META) {
        let meta = element.value();
        let key = meta
            .attr("name")
            .filter(|n| !n.is_empty())
            .or_else(|| meta.attr("property"))
            .filter(|k| !k.is_empty());

        if let (Some(key), Some(content)) = (key, meta.attr("content")) {
            metadata.insert(key.to_string(), content.to_string());
        }
    }

    metadata.insert("title".to_string(), title.to_string());
    metadata
}
