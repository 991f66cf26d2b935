pub mod benchmarks;
pub mod browser;
pub mod cache;
pub mod config;
pub mod extract;
pub mod fetcher;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;
pub mod sources;
pub mod traits;
pub mod types;
pub mod utils;
pub mod valuation;

pub use benchmarks::{BenchmarkEntry, BenchmarkStore, BenchmarkTable, DeepSpecTable};
pub use browser::{BrowserDriver, BrowserSession, HttpDriver};
pub use cache::ResultCache;
pub use config::{AppConfig, ScrapeConfig};
pub use extract::{extract, extract_listing};
pub use fetcher::PageFetcher;
pub use orchestrator::{FetchReport, ScrapeOrchestrator};
pub use pipeline::{RankedListing, RankingOutcome, RankingPipeline};
pub use traits::{SourceAdapter, SourceMetadata};
pub use types::*;
pub use valuation::{Profile, ScoreBreakdown, ValuationEngine};
