//! Site configuration from environment variables.

use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default WordPress REST root.
pub const DEFAULT_API_URL: &str = "https://api.mapleepoch.com/wp-json";

/// Default public site origin.
pub const DEFAULT_FRONTEND_URL: &str = "https://www.mapleepoch.com";

/// Default publication name.
pub const DEFAULT_SITE_NAME: &str = "The Maple Epoch";

/// Default TTL for the memoized category lookup, in seconds.
pub const DEFAULT_CATEGORY_CACHE_TTL_SECS: u64 = 300;

/// Default upstream request timeout, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default precedence of the editor's picks fallback chain.
pub const DEFAULT_EDITORS_PICKS_CHAIN: &str =
    "category:editors-picks,category:editor-picks,sticky,recent";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: String, reason: String },

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// One strategy in the editor's picks fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PicksSource {
    /// Posts from a dedicated category slug.
    Category(String),
    /// Sticky posts.
    Sticky,
    /// Most recent posts.
    Recent,
}

impl PicksSource {
    /// Parse a comma-separated chain like `category:editors-picks,sticky,recent`.
    pub fn parse_chain(chain: &str) -> Result<Vec<PicksSource>, ConfigError> {
        chain
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "sticky" => Ok(PicksSource::Sticky),
                "recent" => Ok(PicksSource::Recent),
                other => other
                    .strip_prefix("category:")
                    .filter(|slug| !slug.is_empty())
                    .map(|slug| PicksSource::Category(slug.to_string()))
                    .ok_or_else(|| ConfigError::InvalidValue {
                        var: "EPOCH_EDITORS_PICKS_CHAIN".to_string(),
                        value: other.to_string(),
                    }),
            })
            .collect()
    }
}

/// Everything the pipelines need to know about the deployment.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// WordPress REST root, e.g. `https://api.mapleepoch.com/wp-json` (no trailing slash).
    pub api_url: String,
    /// Public site origin, e.g. `https://www.mapleepoch.com` (no trailing slash).
    pub frontend_url: String,
    /// Host of `api_url`; rewritten to `frontend_host` in SEO payloads.
    pub api_host: String,
    /// Host of `frontend_url`.
    pub frontend_host: String,
    pub site_name: String,
    pub site_language: String,
    /// Zero disables the category memo.
    pub category_cache_ttl: Duration,
    pub http_timeout: Duration,
    pub bind_addr: String,
    pub editors_picks_chain: Vec<PicksSource>,
}

impl SiteConfig {
    /// Build a config from explicit API and frontend URLs, with every other field defaulted.
    pub fn new(api_url: &str, frontend_url: &str) -> Result<Self, ConfigError> {
        let api_url = api_url.trim_end_matches('/').to_string();
        let frontend_url = frontend_url.trim_end_matches('/').to_string();
        let api_host = host_of("EPOCH_WP_API_URL", &api_url)?;
        let frontend_host = host_of("EPOCH_FRONTEND_URL", &frontend_url)?;

        Ok(Self {
            api_url,
            frontend_url,
            api_host,
            frontend_host,
            site_name: DEFAULT_SITE_NAME.to_string(),
            site_language: "en".to_string(),
            category_cache_ttl: Duration::from_secs(DEFAULT_CATEGORY_CACHE_TTL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            bind_addr: "0.0.0.0:3000".to_string(),
            editors_picks_chain: PicksSource::parse_chain(DEFAULT_EDITORS_PICKS_CHAIN)?,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `EPOCH_WP_API_URL`: WordPress REST root (default: "https://api.mapleepoch.com/wp-json")
    /// - `EPOCH_FRONTEND_URL`: public origin (default: "https://www.mapleepoch.com")
    /// - `EPOCH_SITE_NAME`: publication name (default: "The Maple Epoch")
    /// - `EPOCH_SITE_LANGUAGE`: news sitemap language (default: "en")
    /// - `EPOCH_CATEGORY_CACHE_TTL_SECS`: category memo TTL (default: 300, 0 disables)
    /// - `EPOCH_HTTP_TIMEOUT_SECS`: upstream timeout (default: 30)
    /// - `EPOCH_BIND_ADDR`: server listen address (default: "0.0.0.0:3000")
    /// - `EPOCH_EDITORS_PICKS_CHAIN`: fallback precedence for editor's picks
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("EPOCH_WP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let frontend_url =
            env::var("EPOCH_FRONTEND_URL").unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string());

        let mut config = Self::new(&api_url, &frontend_url)?;

        if let Ok(name) = env::var("EPOCH_SITE_NAME") {
            config.site_name = name;
        }
        if let Ok(lang) = env::var("EPOCH_SITE_LANGUAGE") {
            config.site_language = lang;
        }
        if let Some(secs) = parse_secs("EPOCH_CATEGORY_CACHE_TTL_SECS")? {
            config.category_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs("EPOCH_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Ok(addr) = env::var("EPOCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(chain) = env::var("EPOCH_EDITORS_PICKS_CHAIN") {
            config.editors_picks_chain = PicksSource::parse_chain(&chain)?;
        }

        Ok(config)
    }

    /// `{api_url}/wp/v2`
    pub fn wp_v2(&self) -> String {
        format!("{}/wp/v2", self.api_url)
    }

    /// Absolute public URL for a site path.
    pub fn frontend(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            self.frontend_url.clone()
        } else if path.starts_with('/') {
            format!("{}{}", self.frontend_url, path)
        } else {
            format!("{}/{}", self.frontend_url, path)
        }
    }

    /// Replace the API and/or frontend URL, keeping every other setting.
    pub fn with_urls(
        mut self,
        api_url: Option<&str>,
        frontend_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(api_url) = api_url {
            self.api_url = api_url.trim_end_matches('/').to_string();
            self.api_host = host_of("EPOCH_WP_API_URL", &self.api_url)?;
        }
        if let Some(frontend_url) = frontend_url {
            self.frontend_url = frontend_url.trim_end_matches('/').to_string();
            self.frontend_host = host_of("EPOCH_FRONTEND_URL", &self.frontend_url)?;
        }
        Ok(self)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_FRONTEND_URL).expect("default URLs are valid")
    }
}

fn host_of(var: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| ConfigError::InvalidUrl {
            var: var.to_string(),
            reason: format!("no host in {}", raw),
        })
}

fn parse_secs(var: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
