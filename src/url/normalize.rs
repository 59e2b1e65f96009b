use url::Url;

/// Returns true if the string parses as an absolute URL with an authority
///
/// Used to validate the seed before any rendering starts. Scheme-only URLs
/// such as `mailto:` or `data:` have no host and are rejected.
///
/// # Examples
///
/// ```
/// use webharvest::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/docs"));
/// assert!(!is_valid_url("/docs"));
/// assert!(!is_valid_url("mailto:someone@example.com"));
/// ```
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

/// Resolves `href` against `base_url` and strips the fragment
///
/// Relative, absolute and protocol-relative hrefs are all handled by URL
/// joining. Resolution is fail-soft: if either the base or the join fails,
/// the original `href` is returned unchanged and callers must tolerate it.
///
/// # Arguments
///
/// * `href` - The raw href as it appears in the document
/// * `base_url` - The URL of the page the href was found on
///
/// # Examples
///
/// ```
/// use webharvest::url::normalize;
///
/// assert_eq!(
///     normalize("../b#top", "https://example.com/a/c"),
///     "https://example.com/b"
/// );
/// assert_eq!(
///     normalize("//cdn.example.com/x.png", "https://example.com/"),
///     "https://cdn.example.com/x.png"
/// );
/// ```
pub fn normalize(href: &str, base_url: &str) -> String {
    let resolved = Url::parse(base_url).and_then(|base| base.join(href));

    match resolved {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(e) => {
            tracing::trace!("Leaving href '{}' unresolved against {}: {}", href, base_url, e);
            href.to_string()
        }
    }
}

/// Returns the key a URL is tracked under in the visited set and frontier
///
/// This is the URL normalized against itself, so `https://ex.com` and
/// `https://ex.com/#top` share the key `https://ex.com/`.
pub fn visit_key(url: &str) -> String {
    normalize(url, url)
}
