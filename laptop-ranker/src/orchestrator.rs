use crate::cache::ResultCache;
use crate::config::ScrapeConfig;
use crate::traits::SourceAdapter;
use crate::types::{FetchMode, Listing, SourceReport, SourceStatus};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Everything one fan-out produced, before any ranking filter.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub listings: Vec<Listing>,
    /// One entry per registered adapter, in registration order.
    pub sources: Vec<SourceReport>,
    /// Listings collected from cache and live fetches before filtering.
    pub seen: usize,
    pub duplicates_dropped: usize,
    pub country_filtered: usize,
}

/// Fans a query out to every registered source and merges the answers.
pub struct ScrapeOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<ResultCache>,
    adapter_timeout: Duration,
    lookback_days: u32,
}

enum Slot {
    Cached(String, Vec<Listing>),
    Live(tokio::task::JoinHandle<Result<crate::types::Result<Vec<Listing>>, tokio::time::error::Elapsed>>),
}

impl ScrapeOrchestrator {
    pub fn new(cache: Arc<ResultCache>, config: &ScrapeConfig) -> Self {
        Self {
            adapters: Vec::new(),
            cache,
            adapter_timeout: config.adapter_timeout(),
            lookback_days: 7,
        }
    }

    /// How many earlier days a failed source may fall back to in cache-first mode.
    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_adapter_timeout(mut self, adapter_timeout: Duration) -> Self {
        self.adapter_timeout = adapter_timeout;
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        info!("Registering source: {}", adapter.source_name());
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub async fn fetch(&self, query: &str, country: Option<&str>, mode: FetchMode) -> Vec<Listing> {
        self.fetch_with_report(query, country, mode).await.listings
    }

    /// Never fails: a source that errors, panics or overruns its timeout is
    /// reported and contributes nothing.
    pub async fn fetch_with_report(
        &self,
        query: &str,
        country: Option<&str>,
        mode: FetchMode,
    ) -> FetchReport {
        let today = ResultCache::today();
        let mut slots = Vec::with_capacity(self.adapters.len());

        for adapter in &self.adapters {
            let source = adapter.source_name();
            if mode == FetchMode::CacheFirst {
                if let Some(cached) = self.cache.load(query, &source, today).await {
                    info!("Cache hit for {} ({} listings)", source, cached.len());
                    slots.push(Slot::Cached(today.format("%Y-%m-%d").to_string(), cached));
                    continue;
                }
                debug!("Cache miss for {}, queueing live fetch", source);
            }

            let adapter = Arc::clone(adapter);
            let query = query.to_string();
            let limit = self.adapter_timeout;
            slots.push(Slot::Live(tokio::spawn(async move {
                tokio::time::timeout(limit, adapter.search_all(&query)).await
            })));
        }

        let live = slots.iter().filter(|s| matches!(s, Slot::Live(_))).count();
        info!(
            "Fetching '{}' from {} source(s), {} served from cache",
            query,
            live,
            slots.len() - live
        );

        let mut per_source: Vec<(SourceReport, Vec<Listing>)> = Vec::with_capacity(slots.len());
        let mut fresh: Vec<(String, Vec<Listing>)> = Vec::new();

        for (adapter, slot) in self.adapters.iter().zip(slots) {
            let source = adapter.source_name();
            let (status, listings) = match slot {
                Slot::Cached(date, listings) => (SourceStatus::Cached { date }, listings),
                Slot::Live(handle) => match handle.await {
                    Ok(Ok(Ok(listings))) => {
                        info!("Pulled {} items from source: {}", listings.len(), source);
                        if !listings.is_empty() {
                            fresh.push((source.clone(), listings.clone()));
                        }
                        (SourceStatus::Fetched, listings)
                    }
                    Ok(Ok(Err(e))) => {
                        error!("Source {} failed: {}", source, e);
                        (SourceStatus::Failed { reason: e.to_string() }, Vec::new())
                    }
                    Ok(Err(_)) => {
                        warn!(
                            "Source {} timed out after {}s",
                            source,
                            self.adapter_timeout.as_secs()
                        );
                        (
                            SourceStatus::TimedOut {
                                seconds: self.adapter_timeout.as_secs(),
                            },
                            Vec::new(),
                        )
                    }
                    Err(e) => {
                        error!("Source {} task aborted: {}", source, e);
                        (
                            SourceStatus::Failed {
                                reason: format!("task aborted: {}", e),
                            },
                            Vec::new(),
                        )
                    }
                },
            };
            let (status, listings) = match status {
                SourceStatus::Failed { .. } | SourceStatus::TimedOut { .. }
                    if mode == FetchMode::CacheFirst && self.lookback_days > 0 =>
                {
                    match self.cache.load_latest(query, &source, self.lookback_days).await {
                        Some((date, stale)) => {
                            warn!(
                                "Serving {} listings for {} from snapshot of {}",
                                stale.len(),
                                source,
                                date
                            );
                            let date = date.format("%Y-%m-%d").to_string();
                            (SourceStatus::Cached { date }, stale)
                        }
                        None => (status, listings),
                    }
                }
                _ => (status, listings),
            };
            per_source.push((
                SourceReport {
                    source,
                    status,
                    listings: listings.len(),
                },
                listings,
            ));
        }

        // Each key is (query, source, today), so no two writes share a file.
        let saves = fresh
            .iter()
            .map(|(source, listings)| self.cache.save(query, source, today, listings));
        for ((source, _), result) in fresh.iter().zip(join_all(saves).await) {
            if let Err(e) = result {
                warn!("Failed to cache listings for {}: {}", source, e);
            }
        }

        let mut report = FetchReport::default();
        let mut seen_urls = HashSet::new();
        for (source_report, listings) in per_source {
            report.sources.push(source_report);
            for listing in listings {
                report.seen += 1;
                if !matches_country(&listing, country) {
                    report.country_filtered += 1;
                    continue;
                }
                if !seen_urls.insert(listing.canonical_url()) {
                    report.duplicates_dropped += 1;
                    continue;
                }
                report.listings.push(listing);
            }
        }

        info!(
            "Merged {} listings ({} duplicates, {} filtered by country)",
            report.listings.len(),
            report.duplicates_dropped,
            report.country_filtered
        );
        report
    }
}

/// Listings with no recorded country are kept: older snapshots omit it.
fn matches_country(listing: &Listing, country: Option<&str>) -> bool {
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        Some(wanted) => listing.country.is_empty() || listing.country.eq_ignore_ascii_case(wanted),
        None => true,
    }
}
