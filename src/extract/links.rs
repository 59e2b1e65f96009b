//! Anchor extraction and internal/external classification

use super::noise::NoiseSet;
use super::types::{Link, LinkBuckets};
use crate::url::{base_domain, is_external, normalize};
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("ANCHORS: hardcoded selector is valid"));

/// Extracts every anchor with an `href` outside noise regions
///
/// Links keep document order within each bucket. An href that cannot be
/// resolved still yields a link carrying the raw href, whitespace included,
/// classified internal. Surrounding whitespace never affects resolution.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `noise` - Noise subtrees to skip
/// * `page_url` - URL the page was rendered from, used as the resolution base
pub fn extract_links(document: &Html, noise: &NoiseSet, page_url: &str) -> LinkBuckets {
    let domain = base_domain(page_url);
    let mut buckets = LinkBuckets::default();

    for element in document.select(&ANCHORS) {
        if noise.contains(&element) {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let link = Link {
            href: normalize(href, page_url),
            text: element.text().collect::<String>().trim().to_string(),
            title: element.value().attr("title").map(str::to_string),
        };

        if is_external(&link.href, &domain) {
            buckets.external.push(link);
        } else {
            buckets.internal.push(link);
        }
    }

    buckets
}
