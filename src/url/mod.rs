//! URL scope handling for Webharvest
//!
//! Pure functions for seed validation, href normalization, base-domain
//! extraction, internal/external classification, and compiling the glob
//! pattern that bounds the crawl. Nothing in here holds state.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{base_domain, is_external};
pub use matcher::{compile_matcher, default_pattern, ScopeMatcher};
pub use normalize::{is_valid_url, normalize, visit_key};

use crate::UrlError;

/// Builds the scope matcher for a run
///
/// Uses `pattern` when supplied and non-empty, otherwise the default derived
/// from the seed (see [`default_pattern`]).
///
/// # Arguments
///
/// * `seed` - The validated seed URL
/// * `pattern` - An optional user-supplied glob pattern
///
/// # Returns
///
/// * `Ok(ScopeMatcher)` - The compiled matcher
/// * `Err(UrlError)` - The seed or the pattern could not be used
pub fn scope_for_seed(seed: &str, pattern: Option<&str>) -> Result<ScopeMatcher, UrlError> {
    match pattern.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => compile_matcher(p),
        None => compile_matcher(&default_pattern(seed)?),
    }
}
