//! Detection of non-content regions
//!
//! The parsed document is never mutated. Instead, the roots of noise
//! subtrees are collected once per page and every later pass skips any
//! node that sits inside one of them.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Elements that never carry page content
const NOISE_SELECTOR: &str = "script, style, noscript, nav, footer, header, aside, \
    .ad, .ads, .advert, .advertisement, .sponsored, \
    [class^='ad-'], [class*=' ad-'], [id^='ad-'], [id^='ads-'], \
    [class*='advertisement'], [id*='advertisement'], \
    [data-ad], [data-ad-slot], ins.adsbygoogle";

static NOISE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(NOISE_SELECTOR).expect("NOISE_SELECTOR: hardcoded selector is valid")
});

/// The set of noise subtree roots in one document
#[derive(Debug, Default)]
pub struct NoiseSet {
    roots: HashSet<NodeId>,
}

impl NoiseSet {
    /// Collects every element matching the noise selector
    pub fn detect(document: &Html) -> Self {
        let roots = document.select(&NOISE).map(|el| el.id()).collect();
        Self { roots }
    }

    /// Returns true if `id` is itself a noise root
    pub fn is_root(&self, id: NodeId) -> bool {
        self.roots.contains(&id)
    }

    /// Returns true if the element or any of its ancestors is noise
    pub fn contains(&self, element: &ElementRef<'_>) -> bool {
        if self.roots.is_empty() {
            return false;
        }
        self.is_root(element.id()) || element.ancestors().any(|a| self.is_root(a.id()))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
