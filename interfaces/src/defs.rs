use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market segment a search is aimed at. Selects the query hint, the price
/// floor, the keyword filter and the scoring profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Gaming,
    Work,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gaming => "gaming",
            Category::Work => "work",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gaming" | "gamer" | "game" => Ok(Category::Gaming),
            "work" | "office" | "business" => Ok(Category::Work),
            "general" | "all" | "" => Ok(Category::General),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// How the scrape layer treats the on-disk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    CacheFirst,
    ForceRefresh,
}

/// A category-tagged search as sent by a front-end (HTTP layer, CLI, voice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, category: Category) -> Self {
        Self {
            query: query.into(),
            category,
            country: None,
            price_min: None,
            price_max: None,
            limit: default_limit(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One row of the ranked output handed back to a front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub rank: usize,
    pub source: String,
    pub country: String,
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub url: String,
    pub specs: serde_json::Map<String, serde_json::Value>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<serde_json::Value>,
}

/// On-disk layout of one cached (query, source, date) listing snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile<T> {
    pub query: String,
    #[serde(alias = "store")]
    pub source: String,
    pub date: String,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

// Object style note:
// Everything here is plain data. Front-ends serialize a SearchRequest, the
// ranking core answers with RankedItems, and the cache persists
// SnapshotFiles. No behaviour lives in this crate beyond parsing helpers.
