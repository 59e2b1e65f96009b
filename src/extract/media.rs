//! Image and video extraction

use super::noise::NoiseSet;
use super::types::{MediaBuckets, MediaItem, MediaKind};
use crate::url::normalize;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("IMAGES: hardcoded selector is valid"));

static VIDEOS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video").expect("VIDEOS: hardcoded selector is valid"));

static SOURCES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("source[src]").expect("SOURCES: hardcoded selector is valid")
});

/// Extracts images and videos outside noise regions
///
/// Images need a non-empty `src`; videos contribute their own `src` and the
/// `src` of every nested `<source>`. Sources given as data URIs are dropped:
/// they reference nothing fetchable and would bloat the output.
pub fn extract_media(document: &Html, noise: &NoiseSet, page_url: &str) -> MediaBuckets {
    let mut media = MediaBuckets::default();

    for img in document.select(&IMAGES) {
        if noise.contains(&img) {
            continue;
        }
        if let Some(src) = usable_src(&img) {
            media.images.push(MediaItem {
                src: normalize(src, page_url),
                kind: MediaKind::Image,
                alt: img.value().attr("alt").map(str::to_string),
            });
        }
    }

    for video in document.select(&VIDEOS) {
        if noise.contains(&video) {
            continue;
        }
        let nested = video.select(&SOURCES).filter_map(|s| usable_src(&s));
        for src in usable_src(&video).into_iter().chain(nested) {
            media.videos.push(MediaItem {
                src: normalize(src, page_url),
                kind: MediaKind::Video,
                alt: None,
            });
        }
    }

    media
}

fn usable_src<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty() && !is_data_uri(src))
}

fn is_data_uri(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}
