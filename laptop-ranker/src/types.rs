use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use interfaces::defs::{Category, FetchMode, RankedItem, SearchRequest, SnapshotFile};

/// One product card scraped from a retailer search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(alias = "store")]
    pub source: String,
    #[serde(default)]
    pub country: String,
    pub title: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub url: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Listing {
    pub fn new(
        source: impl Into<String>,
        country: impl Into<String>,
        title: impl Into<String>,
        price: f64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            country: country.into(),
            title: title.into(),
            price,
            currency: default_currency(),
            url: url.into(),
            specs: BTreeMap::new(),
        }
    }

    pub fn with_specs(mut self, specs: BTreeMap<String, String>) -> Self {
        self.specs = specs;
        self
    }

    /// Deduplication key: the URL without query string or fragment.
    pub fn canonical_url(&self) -> String {
        crate::parser::canonical_url(&self.url)
    }

    /// Raw specs flattened to `key:value` pairs, the free-text companion of the title.
    pub fn specs_text(&self) -> String {
        self.specs
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    #[default]
    None,
    Ips,
    MiniLed,
    Oled,
}

impl PanelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::None => "none",
            PanelKind::Ips => "ips",
            PanelKind::MiniLed => "miniled",
            PanelKind::Oled => "oled",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware fingerprint derived from a listing's title and specs text.
/// Always recomputed, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CanonicalSpec {
    pub cpu_id: Option<String>,
    pub gpu_id: Option<String>,
    pub tgp_watts: Option<u32>,
    /// 0..=3 for roughly 8 / 16 / 32 / 64+ GB.
    pub ram_tier: u8,
    pub storage_gb: u32,
    /// 0 when no plausible refresh rate was found.
    pub refresh_hz: u32,
    pub panel_kind: PanelKind,
    pub os_present: bool,
}

impl CanonicalSpec {
    pub fn has_processor_match(&self) -> bool {
        self.cpu_id.is_some() || self.gpu_id.is_some()
    }

    /// The raw-specs map attached to listings by the adapters.
    pub fn to_specs_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if let Some(cpu) = &self.cpu_id {
            map.insert("cpu".to_string(), cpu.clone());
        }
        if let Some(gpu) = &self.gpu_id {
            map.insert("gpu".to_string(), gpu.clone());
        }
        if let Some(tgp) = self.tgp_watts {
            map.insert("tgp_w".to_string(), tgp.to_string());
        }
        map
    }
}

/// How a single registered source contributed to a fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Cached { date: String },
    Fetched,
    Failed { reason: String },
    TimedOut { seconds: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
    pub listings: usize,
}

impl SourceReport {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            SourceStatus::Failed { .. } | SourceStatus::TimedOut { .. }
        )
    }
}

/// Counters attached to every ranking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub seen: usize,
    pub duplicates_dropped: usize,
    pub country_filtered: usize,
    pub dropped_by_price: usize,
    pub dropped_by_keyword: usize,
    pub scored: usize,
    pub sources: Vec<SourceReport>,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.sources.iter().filter(|s| s.is_failure()).count();
        write!(
            f,
            "seen={} duplicates={} country_filtered={} dropped_by_price={} dropped_by_keyword={} scored={} failed_sources={}/{}",
            self.seen,
            self.duplicates_dropped,
            self.country_filtered,
            self.dropped_by_price,
            self.dropped_by_keyword,
            self.scored,
            failed,
            self.sources.len()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Browser automation error: {0}")]
    Browser(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("{what} timed out after {seconds}s")]
    Timeout { what: String, seconds: u64 },

    #[error("Benchmark snapshot error: {0}")]
    Snapshot(String),

    #[error("No results from any source ({diagnostics})")]
    NoResults { diagnostics: Diagnostics },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RankerError>;
