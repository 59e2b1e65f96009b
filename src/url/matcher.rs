use crate::UrlError;
use regex::Regex;
use std::fmt;
use url::Url;

/// A compiled scope rule deciding which discovered URLs may be crawled
///
/// Built once per run from a glob-like pattern and shared read-only after
/// that. Matching is anchored on both ends: the whole URL must match.
#[derive(Clone)]
pub struct ScopeMatcher {
    pattern: String,
    regex: Regex,
}

impl ScopeMatcher {
    /// Returns true if the full URL matches the scope pattern
    pub fn test(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Returns the glob pattern this matcher was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for ScopeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeMatcher")
            .field("pattern", &self.pattern)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Compiles a glob pattern into a full-string URL matcher
///
/// # Pattern Syntax
///
/// - `**` matches any run of characters, including `/`
/// - `*` matches any run of characters except `/`
/// - every other character matches itself literally (`.`, `?`, `+` and
///   other regex metacharacters are escaped)
///
/// `**` is recognised before `*`, so `a/**` never degrades into two
/// single-segment wildcards.
///
/// # Examples
///
/// ```
/// use webharvest::url::compile_matcher;
///
/// let one_level = compile_matcher("https://a.com/*").unwrap();
/// assert!(one_level.test("https://a.com/x"));
/// assert!(!one_level.test("https://a.com/x/y"));
///
/// let any_depth = compile_matcher("https://a.com/**").unwrap();
/// assert!(any_depth.test("https://a.com/x/y/z"));
/// ```
pub fn compile_matcher(pattern: &str) -> Result<ScopeMatcher, UrlError> {
    let body = pattern
        .split("**")
        .map(|part| {
            part.split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("[^/]*")
        })
        .collect::<Vec<_>>()
        .join(".*");

    let regex = Regex::new(&format!("^{}$", body)).map_err(|e| UrlError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(ScopeMatcher {
        pattern: pattern.to_string(),
        regex,
    })
}

/// Derives the default scope pattern for a seed URL
///
/// The default is the seed's origin and path followed by `**`: anything
/// under the seed path. Query and fragment are ignored.
///
/// # Examples
///
/// ```
/// use webharvest::url::default_pattern;
///
/// assert_eq!(default_pattern("https://ex.com").unwrap(), "https://ex.com/**");
/// assert_eq!(
///     default_pattern("https://ex.com/docs/?v=2#top").unwrap(),
///     "https://ex.com/docs/**"
/// );
/// ```
pub fn default_pattern(seed: &str) -> Result<String, UrlError> {
    let url = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;

    if !url.has_host() {
        return Err(UrlError::MissingHost(seed.to_string()));
    }

    Ok(format!(
        "{}{}**",
        url.origin().ascii_serialization(),
        url.path()
    ))
}
