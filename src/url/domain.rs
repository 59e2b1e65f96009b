use url::Url;

/// Extracts the base domain of a URL
///
/// The base domain is the lowercase hostname with a leading `www.` removed.
/// Returns an empty string when the URL cannot be parsed or has no host.
///
/// # Examples
///
/// ```
/// use webharvest::url::base_domain;
///
/// assert_eq!(base_domain("https://www.example.com/path"), "example.com");
/// assert_eq!(base_domain("https://docs.example.com/"), "docs.example.com");
/// assert_eq!(base_domain("not a url"), "");
/// ```
pub fn base_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(strip_www))
        .unwrap_or_default()
}

/// Returns true if `url` is outside `base_domain` and its subdomains
///
/// A URL is internal when its `www.`-stripped host equals `base_domain` or
/// ends with `.` followed by `base_domain`. Unparsable URLs and URLs without
/// a host are reported as internal: classification fails soft towards
/// continued crawling, and the scope matcher still gates enqueueing.
///
/// # Examples
///
/// ```
/// use webharvest::url::is_external;
///
/// assert!(!is_external("https://example.com/a", "example.com"));
/// assert!(!is_external("https://blog.example.com/a", "example.com"));
/// assert!(is_external("https://other.org/a", "example.com"));
/// assert!(!is_external("::garbage::", "example.com"));
/// ```
pub fn is_external(url: &str, base_domain: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    let host = match parsed.host_str() {
        Some(h) => strip_www(h),
        None => return false,
    };

    host != base_domain && !host.ends_with(&format!(".{}", base_domain))
}

fn strip_www(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
