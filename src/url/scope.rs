use crate::config::CrawlConfig;
use url::Url;

/// Decides whether a URL's host belongs to the crawl
///
/// A URL is in scope iff its host equals the seed host or `"www." + seed host`.
/// There is no subdomain wildcarding and no scheme restriction.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    allowed: Vec<String>,
}

impl DomainFilter {
    /// Creates a filter for the given seed host
    ///
    /// # Examples
    ///
    /// ```
    /// use site_sweep::url::DomainFilter;
    /// use url::Url;
    ///
    /// let filter = DomainFilter::new("example.com");
    /// assert!(filter.in_scope(&Url::parse("https://www.example.com/").unwrap()));
    /// assert!(!filter.in_scope(&Url::parse("https://blog.example.com/").unwrap()));
    /// ```
    pub fn new(seed_host: &str) -> Self {
        let seed_host = seed_host.to_lowercase();
        Self {
            allowed: vec![format!("www.{}", seed_host), seed_host],
        }
    }

    /// Creates a filter from the allowed domain set of a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            allowed: config
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the URL's host is one of the allowed domains
    pub fn in_scope(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => self.allows_host(host),
            None => false,
        }
    }

    /// Returns true if the host is one of the allowed domains
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed.iter().any(|d| d.eq_ignore_ascii_case(host))
    }

    /// The allowed domain set
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}
