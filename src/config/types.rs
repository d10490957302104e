use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Per-request timeout used when the config does not set one (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Worker pool size used when the config does not set one
pub const DEFAULT_MAX_CONCURRENT_FETCHES: u32 = 1;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything but the seed and
    /// the image directory
    pub fn new(seed_url: impl Into<String>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            crawler: CrawlerConfig {
                seed_url: seed_url.into(),
                request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
                max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
                max_depth: None,
            },
            user_agent: UserAgentConfig::default(),
            output: OutputConfig {
                image_dir: image_dir.into(),
                summary_path: None,
            },
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Starting page; its authority fixes the crawl domain
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Timeout applied to every page and image request (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Number of fetch workers running at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Deepest breadth-first level to fetch; unlimited when absent
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,
}

impl CrawlerConfig {
    /// Per-request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_concurrent_fetches() -> u32 {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one file per downloaded image
    #[serde(rename = "image-dir")]
    pub image_dir: PathBuf,

    /// Optional markdown report written when the crawl finishes
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<PathBuf>,
}
