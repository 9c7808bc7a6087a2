use crate::url::{canonicalize, extract_host, validate_domain_input};
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main settings structure for Site-Sweep, as read from an optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crawler: CrawlerSettings,
    pub http: HttpSettings,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputSettings,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerSettings {
    /// Maximum number of hops from the seed page
    pub max_depth: u32,

    /// Maximum number of concurrent fetches
    pub concurrency: u32,

    /// Minimum pause after a fetch completes before the next one starts (milliseconds)
    pub base_delay_ms: u64,

    /// Upper bound of the random delay added to the base delay (milliseconds)
    pub jitter_ms: u64,

    /// Whether pacing is shared by the whole crawl or kept per host
    pub limiter_scope: LimiterScope,

    /// Extra attempts for transient fetch failures
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further attempt (milliseconds)
    pub retry_backoff_ms: u64,

    /// Stop dispatching after this many seconds
    pub crawl_timeout_secs: Option<u64>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_depth: 3,
            concurrency: 4,
            base_delay_ms: 500,
            jitter_ms: 500,
            limiter_scope: LimiterScope::Global,
            max_retries: 0,
            retry_backoff_ms: 1000,
            crawl_timeout_secs: None,
        }
    }
}

/// Scope of the politeness pacing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LimiterScope {
    /// One pacing record for the whole crawl
    #[default]
    Global,
    /// One pacing record per host
    PerHost,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpSettings {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteSweep".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/site-sweep".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory the `<domain>_log.txt` file is written into
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Retry behavior for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before the given retry attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}

/// Immutable configuration of one crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The domain the crawl was started for, as typed by the user
    pub domain: String,

    /// Canonical seed URL (depth 0)
    pub seed: Url,

    /// Host of the seed URL
    pub seed_host: String,

    /// Hosts that may be fetched: the seed host and its `www.` variant
    pub allowed_domains: Vec<String>,

    pub max_depth: u32,
    pub concurrency: usize,
    pub base_delay: Duration,
    pub jitter: Duration,
    pub limiter_scope: LimiterScope,
    pub retry: RetryPolicy,
    pub crawl_timeout: Option<Duration>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl CrawlConfig {
    /// Builds the configuration for crawling `https://<domain>/`
    ///
    /// # Example
    ///
    /// ```
    /// use site_sweep::config::{CrawlConfig, Settings};
    ///
    /// let config = CrawlConfig::new("example.com", &Settings::default()).unwrap();
    /// assert_eq!(config.seed.as_str(), "https://example.com/");
    /// assert_eq!(config.allowed_domains, vec!["example.com", "www.example.com"]);
    /// ```
    pub fn new(domain: &str, settings: &Settings) -> Result<Self, ConfigError> {
        let domain = validate_domain_input(domain)?;
        let seed = Url::parse(&format!("https://{}", domain))
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL: {}", e)))?;
        Self::build(domain, seed, settings)
    }

    /// Builds the configuration for an explicit seed URL
    ///
    /// The domain is taken from the seed's host. This allows plain `http://` seeds
    /// and hosts with ports, such as local test servers.
    pub fn with_seed(seed: &str, settings: &Settings) -> Result<Self, ConfigError> {
        let seed = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
        let domain = extract_host(&seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed)))?;
        Self::build(domain, seed, settings)
    }

    fn build(domain: String, seed: Url, settings: &Settings) -> Result<Self, ConfigError> {
        super::validation::validate(settings)?;

        let seed = canonicalize(seed.as_str())?;
        let seed_host = extract_host(&seed).ok_or(crate::UrlError::MissingDomain)?;
        let allowed_domains = allowed_domains_for(&seed_host);

        let crawler = &settings.crawler;
        Ok(Self {
            domain,
            seed,
            seed_host,
            allowed_domains,
            max_depth: crawler.max_depth,
            concurrency: crawler.concurrency as usize,
            base_delay: Duration::from_millis(crawler.base_delay_ms),
            jitter: Duration::from_millis(crawler.jitter_ms),
            limiter_scope: crawler.limiter_scope,
            retry: RetryPolicy {
                max_retries: crawler.max_retries,
                backoff: Duration::from_millis(crawler.retry_backoff_ms),
            },
            crawl_timeout: crawler.crawl_timeout_secs.map(Duration::from_secs),
            request_timeout: Duration::from_secs(settings.http.request_timeout_secs),
            connect_timeout: Duration::from_secs(settings.http.connect_timeout_secs),
            max_redirects: settings.http.max_redirects,
            user_agent: settings.user_agent.header_value(),
        })
    }
}

/// The seed host plus its `www.` variant
fn allowed_domains_for(seed_host: &str) -> Vec<String> {
    vec![seed_host.to_string(), format!("www.{}", seed_host)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_https_seed() {
        let config = CrawlConfig::new("Example.com", &Settings::default()).unwrap();
        assert_eq!(config.domain, "example.com");
        assert_eq!(config.seed.as_str(), "https://example.com/");
        assert_eq!(config.seed_host, "example.com");
    }

    #[test]
    fn test_allowed_domains_include_www_variant() {
        let config = CrawlConfig::new("example.co.uk", &Settings::default()).unwrap();
        assert_eq!(
            config.allowed_domains,
            vec!["example.co.uk".to_string(), "www.example.co.uk".to_string()]
        );
    }

    #[test]
    fn test_new_rejects_invalid_domain() {
        let result = CrawlConfig::new("not a domain", &Settings::default());
        assert!(matches!(result, Err(ConfigError::InvalidDomain(_))));
    }

    #[test]
    fn test_with_seed_keeps_scheme_and_port() {
        let config = CrawlConfig::with_seed("http://127.0.0.1:8080", &Settings::default()).unwrap();
        assert_eq!(config.seed.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.seed_host, "127.0.0.1");
    }

    #[test]
    fn test_settings_copied_into_config() {
        let mut settings = Settings::default();
        settings.crawler.max_depth = 1;
        settings.crawler.concurrency = 8;
        settings.crawler.base_delay_ms = 250;
        settings.crawler.crawl_timeout_secs = Some(60);

        let config = CrawlConfig::new("example.com", &settings).unwrap();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.crawl_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
        };
        assert_eq!(ua.header_value(), "TestBot/1.0 (+https://example.com/about)");
    }
}
