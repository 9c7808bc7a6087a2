use crate::UrlError;
use url::Url;

/// Extracts the host from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_sweep::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Validates a domain typed by the user
///
/// Accepts `host.tld` or `host.tld.cc`: two or three dot-separated labels made of
/// ASCII letters, digits and hyphens, where no label starts or ends with a hyphen.
/// The input is trimmed and lowercased before checking.
///
/// # Returns
///
/// * `Ok(String)` - The normalized domain
/// * `Err(UrlError::InvalidDomain)` - The input does not look like a domain
///
/// # Examples
///
/// ```
/// use site_sweep::url::validate_domain_input;
///
/// assert_eq!(validate_domain_input(" Example.com ").unwrap(), "example.com");
/// assert!(validate_domain_input("example.co.uk").is_ok());
/// assert!(validate_domain_input("example").is_err());
/// ```
pub fn validate_domain_input(input: &str) -> Result<String, UrlError> {
    let domain = input.trim().to_lowercase();
    let invalid = || UrlError::InvalidDomain(input.trim().to_string());

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.len() > 3 {
        return Err(invalid());
    }

    for label in &labels {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(invalid());
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid());
        }
    }

    Ok(domain)
}
