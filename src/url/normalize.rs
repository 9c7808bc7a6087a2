use crate::UrlError;
use url::Url;

/// Canonicalizes a URL into the form used as the dedup key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Lowercasing the host, dropping default ports and resolving dot segments in the
/// path are done by the URL parser itself.
///
/// # Examples
///
/// ```
/// use site_sweep::url::canonicalize;
///
/// let url = canonicalize("https://EXAMPLE.com:443/a/../about#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_root_path() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_fragment_removed() {
        let url = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_host_lowercased() {
        let url = canonicalize("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_default_port_dropped() {
        let url = canonicalize("http://example.com:80/").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_query_preserved() {
        let url = canonicalize("https://example.com/search?q=rust&page=2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust&page=2");
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let a = canonicalize("https://example.com/about").unwrap();
        let b = canonicalize("https://example.com/about/").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            canonicalize("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            canonicalize("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(canonicalize("not a url"), Err(UrlError::Parse(_))));
    }
}
