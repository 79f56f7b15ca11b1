use crate::browser::BrowserConfig;
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub scrape: ScrapeSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// First port to try binding
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of consecutive ports tried before giving up
    #[serde(default = "default_port_attempts")]
    pub port_attempts: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSection {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Disable images in browser (faster loading)
    #[serde(default = "default_true")]
    pub disable_images: bool,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Additional Chrome flags
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Timeouts, limits and retry settings for one pipeline run
#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeSettings {
    /// Timeout for loading the search entry page and detail pages
    #[serde(default = "default_initial_load_timeout")]
    pub initial_load_timeout_secs: u64,

    /// Timeout for element visibility waits
    #[serde(default = "default_element_timeout")]
    pub element_timeout_secs: u64,

    /// Upper bound for a single quiescence wait
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// How long the rendered page must stay unchanged to count as idle
    #[serde(default = "default_quiet_period")]
    pub quiet_period_ms: u64,

    /// Safety cap on visited results pages
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_detail_retries")]
    pub detail_retries: usize,

    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,

    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
}

fn default_true() -> bool { true }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_port_attempts() -> u16 { 11 }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_initial_load_timeout() -> u64 { 60 }
fn default_element_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 30 }
fn default_quiet_period() -> u64 { 500 }
fn default_max_pages() -> usize { 200 }
fn default_detail_retries() -> usize { 1 }
fn default_initial_retry_delay() -> u64 { 500 }
fn default_max_retry_delay() -> u64 { 4000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            port_attempts: default_port_attempts(),
        }
    }
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            disable_images: true,
            user_agent: None,
            extra_args: Vec::new(),
        }
    }
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            initial_load_timeout_secs: default_initial_load_timeout(),
            element_timeout_secs: default_element_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            quiet_period_ms: default_quiet_period(),
            max_pages: default_max_pages(),
            detail_retries: default_detail_retries(),
            initial_retry_delay_ms: default_initial_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl BrowserSection {
    /// Build the launch configuration for a headless Chrome session
    pub fn to_browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::default();
        config.headless = self.headless;
        config.window_size = (self.window_width, self.window_height);
        config.disable_images = self.disable_images;
        if let Some(ua) = &self.user_agent {
            config.user_agent = Some(ua.clone());
        }
        config.chrome_flags.extend(self.extra_args.iter().cloned());
        config
    }
}

impl ScrapeSettings {
    pub fn initial_load_timeout(&self) -> Duration {
        Duration::from_secs(self.initial_load_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.detail_retries,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
        }
    }
}
