use core_config::{ConfigError, FromEnv, env_list, env_or_default, env_parse, env_required};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Known placeholder images served by the catalog's image host
pub const DEFAULT_BLOCKED_IMAGE_URLS: [&str; 3] = [
    "https://img3.oastatic.com/img2/70047569/c/variant.png",
    "https://img1.oastatic.com/img2/70954987/c/variant.png",
    "https://img.oastatic.com/img2/604696010/c/variant.jpg",
];

/// Recommendation service client configuration
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl RecommenderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for RecommenderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_required("RECOMMENDER_URL")?;
        let timeout_secs: u64 = env_parse("RECOMMENDER_TIMEOUT_SECS", "120")?;

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }
}

/// Maps API client configuration
#[derive(Clone)]
pub struct MapsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl MapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_MAPS_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keep the API key out of logs
impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FromEnv for MapsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("GOOGLE_API_KEY")?;
        let base_url = env_or_default("MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL);
        let timeout_secs: u64 = env_parse("MAPS_TIMEOUT_SECS", "10")?;

        Ok(Self::new(api_key)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }
}

/// Image URLs never shown as a result thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlocklist {
    urls: HashSet<String>,
}

impl ImageBlocklist {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// `Some(url)` when the URL is non-empty and allowed
    pub fn allow<'a>(&self, url: &'a str) -> Option<&'a str> {
        (!url.is_empty() && !self.is_blocked(url)).then_some(url)
    }
}

impl Default for ImageBlocklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_IMAGE_URLS)
    }
}

impl FromEnv for ImageBlocklist {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_list(
            "BLOCKED_IMAGE_URLS",
            &DEFAULT_BLOCKED_IMAGE_URLS,
        )))
    }
}

/// Everything the discovery domain reads from the environment
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub recommender: RecommenderConfig,
    pub maps: MapsConfig,
    pub blocklist: ImageBlocklist,
}

impl FromEnv for DiscoveryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            recommender: RecommenderConfig::from_env()?,
            maps: MapsConfig::from_env()?,
            blocklist: ImageBlocklist::from_env()?,
        })
    }
}
