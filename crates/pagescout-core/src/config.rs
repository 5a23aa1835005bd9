//! Configuration — YAML config + env var overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory root, e.g. https://www.yellowpages.com
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where listing CSVs are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Listings the directory shows per result page
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,

    /// Timeout for a search result page
    #[serde(default = "default_page_timeout")]
    pub page_timeout_seconds: u64,

    /// Timeout for a business website or contact page
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Websites processed at once by the contact finder
    #[serde(default = "default_max_concurrent_sites")]
    pub max_concurrent_sites: usize,

    /// Upper bound of the random pause between result pages (0 disables it)
    #[serde(default)]
    pub page_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://www.yellowpages.com".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_user_agent() -> String {
    concat!("pagescout/", env!("CARGO_PKG_VERSION")).into()
}
fn default_results_per_page() -> u32 {
    30
}
fn default_page_timeout() -> u64 {
    30
}
fn default_fetch_timeout() -> u64 {
    15
}
fn default_max_concurrent_sites() -> usize {
    10
}

impl Config {
    /// Load config from a YAML file with env var overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    /// (still subject to env var overrides).
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.is_file() {
            return Self::load(config_path);
        }
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `PAGESCOUT_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("PAGESCOUT_BASE_URL") {
            self.base_url = url;
        }
        if let Some(dir) = var("PAGESCOUT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(ua) = var("PAGESCOUT_USER_AGENT") {
            self.user_agent = ua;
        }
        if let Some(n) = var("PAGESCOUT_MAX_CONCURRENT_SITES") {
            self.max_concurrent_sites = n
                .parse()
                .with_context(|| format!("PAGESCOUT_MAX_CONCURRENT_SITES is not a number: {n}"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base_url must be an http or https URL, got '{}'", self.base_url);
        }
        if self.results_per_page == 0 {
            anyhow::bail!("results_per_page must be at least 1");
        }
        if self.max_concurrent_sites == 0 {
            anyhow::bail!("max_concurrent_sites must be at least 1");
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            user_agent: default_user_agent(),
            results_per_page: default_results_per_page(),
            page_timeout_seconds: default_page_timeout(),
            fetch_timeout_seconds: default_fetch_timeout(),
            max_concurrent_sites: default_max_concurrent_sites(),
            page_delay_ms: 0,
        }
    }
}
