use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Tuning for page fetching and browser-style interaction with retailer pages.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub post_navigation_delay_ms: u64,
    pub consent_delay_ms: u64,
    pub consent_max_clicks: usize,
    pub card_wait_seconds: u64,
    pub card_poll_interval_ms: u64,
    pub scroll_steps: usize,
    pub scroll_pause_ms: u64,
    pub max_pages: u32,
    pub adapter_timeout_seconds: u64,
    pub max_redirects: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            timeout_seconds: 25,
            max_retries: 2,
            retry_delay_seconds: 1,
            post_navigation_delay_ms: 800,
            consent_delay_ms: 0,
            consent_max_clicks: 2,
            card_wait_seconds: 12,
            card_poll_interval_ms: 500,
            scroll_steps: 14,
            scroll_pause_ms: 450,
            max_pages: 3,
            adapter_timeout_seconds: 90,
            max_redirects: 5,
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(ua) = env::var("SCRAPER_USER_AGENT") {
            if !ua.trim().is_empty() {
                config.user_agent = ua;
            }
        }
        config.timeout_seconds = env_parse("SCRAPER_REQUEST_TIMEOUT").unwrap_or(config.timeout_seconds);
        if let Some(delay) = env_parse::<f64>("SCRAPER_DELAY_SEC") {
            config.post_navigation_delay_ms = (delay.max(0.0) * 1000.0) as u64;
        }
        config.max_pages = env_parse("SCRAPER_MAX_PAGES").unwrap_or(config.max_pages).max(1);
        config.adapter_timeout_seconds =
            env_parse("SCRAPER_ADAPTER_TIMEOUT").unwrap_or(config.adapter_timeout_seconds);
        config
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_seconds)
    }

    /// A configuration with every wait collapsed, for scripted sessions.
    pub fn instant() -> Self {
        Self {
            retry_delay_seconds: 0,
            post_navigation_delay_ms: 0,
            consent_delay_ms: 0,
            card_wait_seconds: 0,
            card_poll_interval_ms: 1,
            scroll_pause_ms: 0,
            ..Self::default()
        }
    }
}

/// Where the pipeline keeps its files and which defaults it applies.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache_dir: PathBuf,
    pub bench_dir: PathBuf,
    pub lookback_days: u32,
    pub default_country: String,
    pub scrape: ScrapeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache/prices"),
            bench_dir: PathBuf::from(".bench_cache"),
            lookback_days: 7,
            default_country: "FR".to_string(),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_dir: env::var("LAPTOP_RANKER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            bench_dir: env::var("LAPTOP_RANKER_BENCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.bench_dir),
            lookback_days: env_parse("LAPTOP_RANKER_LOOKBACK_DAYS").unwrap_or(defaults.lookback_days),
            default_country: env::var("DEFAULT_COUNTRY").unwrap_or(defaults.default_country),
            scrape: ScrapeConfig::from_env(),
        }
    }

    pub fn cpu_snapshot_path(&self) -> PathBuf {
        self.bench_dir.join("cpu_ranks.json")
    }

    pub fn gpu_snapshot_path(&self) -> PathBuf {
        self.bench_dir.join("gpu_ranks.json")
    }

    pub fn deep_specs_path(&self) -> PathBuf {
        self.bench_dir.join("deep_specs.json")
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
