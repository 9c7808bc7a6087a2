//! URL handling module for Site-Sweep
//!
//! This module provides domain input validation, URL canonicalization, host
//! extraction and the domain filter that decides which URLs may be fetched.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_host, validate_domain_input};
pub use normalize::{canonicalize, canonicalize_url};
pub use scope::DomainFilter;

/// Returns the URL text without its `http://` or `https://` prefix
///
/// Used for console display only; persisted output keeps the full URL.
///
/// # Examples
///
/// ```
/// use site_sweep::url::strip_scheme;
///
/// assert_eq!(strip_scheme("https://example.com/about"), "example.com/about");
/// assert_eq!(strip_scheme("example.com"), "example.com");
/// ```
pub fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_https() {
        assert_eq!(strip_scheme("https://example.com/"), "example.com/");
    }

    #[test]
    fn test_strip_http() {
        assert_eq!(strip_scheme("http://example.com/a"), "example.com/a");
    }

    #[test]
    fn test_strip_leaves_other_text_alone() {
        assert_eq!(strip_scheme("ftp://example.com/"), "ftp://example.com/");
    }
}
