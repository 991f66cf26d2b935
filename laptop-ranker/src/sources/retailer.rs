use crate::browser::{
    default_strategies, dismiss_consent, extract_cards, lazy_scroll, navigate, wait_for_any,
    BrowserDriver, BrowserSession, ExtractionStrategy,
};
use crate::config::ScrapeConfig;
use crate::extract::extract;
use crate::parser::{canonical_url, clean_href, parse_price_eur, CardSelectorSpec, RawCard};
use crate::traits::{SourceAdapter, SourceMetadata};
use crate::types::{Listing, RankerError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::form_urlencoded;

/// Titles shorter than this are layout fragments, not products.
const MIN_TITLE_LEN: usize = 6;

/// Everything that differs between two retailer search pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RetailerProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub origin: &'static str,
    /// Contains `{query}` and, for paginated sources, `{page}`.
    pub search_url: &'static str,
    pub cards: CardSelectorSpec,
    pub ready_selectors: &'static [&'static str],
    pub consent_selectors: &'static [&'static str],
    pub consent_delay_ms: Option<u64>,
    pub consent_max_clicks: Option<usize>,
    pub max_pages: u32,
    pub tags: &'static [&'static str],
}

impl RetailerProfile {
    pub fn is_paginated(&self) -> bool {
        self.search_url.contains("{page}")
    }

    /// The query is form-encoded, so spaces become `+`.
    pub fn search_url(&self, query: &str, page: u32) -> String {
        let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let encoded: String = form_urlencoded::byte_serialize(collapsed.as_bytes()).collect();
        self.search_url
            .replace("{query}", &encoded)
            .replace("{page}", &page.max(1).to_string())
    }
}

/// Counters for one batch of scraped cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardStats {
    pub seen: usize,
    pub kept: usize,
    pub dropped_incomplete: usize,
    pub duplicates: usize,
}

/// Generic browser-driven search over one retailer profile.
pub struct RetailerSource {
    profile: RetailerProfile,
    driver: Arc<dyn BrowserDriver>,
    config: ScrapeConfig,
    strategies: Arc<Vec<Box<dyn ExtractionStrategy>>>,
}

impl RetailerSource {
    pub fn new(profile: RetailerProfile, driver: Arc<dyn BrowserDriver>, config: ScrapeConfig) -> Self {
        Self {
            profile,
            driver,
            config,
            strategies: Arc::new(default_strategies()),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    pub fn profile(&self) -> &RetailerProfile {
        &self.profile
    }

    fn page_count(&self) -> u32 {
        if self.profile.is_paginated() {
            self.profile.max_pages.min(self.config.max_pages).max(1)
        } else {
            1
        }
    }

    /// Loads one search page and reads its raw cards.
    async fn scrape_page(&self, query: &str, page: u32) -> Result<Vec<RawCard>> {
        let url = self.profile.search_url(query, page);
        let mut session = self.driver.new_session().await?;
        let result = self.drive(session.as_mut(), &url).await;
        if let Err(e) = session.close().await {
            debug!("Closing session for {} failed: {}", self.profile.name, e);
        }
        result
    }

    async fn drive(&self, session: &mut dyn BrowserSession, url: &str) -> Result<Vec<RawCard>> {
        debug!("{}: navigating to {}", self.profile.name, url);
        navigate(session, url, &self.config).await?;

        let consent_delay = self.profile.consent_delay_ms.unwrap_or(self.config.consent_delay_ms);
        if consent_delay > 0 {
            tokio::time::sleep(Duration::from_millis(consent_delay)).await;
        }
        let max_clicks = self
            .profile
            .consent_max_clicks
            .unwrap_or(self.config.consent_max_clicks);
        let clicks = dismiss_consent(session, self.profile.consent_selectors, max_clicks).await;
        if clicks > 0 {
            debug!("{}: dismissed {} consent overlay(s)", self.profile.name, clicks);
        }

        if self.config.post_navigation_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.post_navigation_delay_ms)).await;
        }

        match wait_for_any(&*session, self.profile.ready_selectors, &self.config).await {
            Some(selector) => debug!("{}: cards ready via {}", self.profile.name, selector),
            None => debug!(
                "{}: no card selector appeared, extracting anyway",
                self.profile.name
            ),
        }

        let steps = lazy_scroll(session, &self.config).await;
        debug!("{}: scrolled {} step(s)", self.profile.name, steps);

        for selector in self.profile.ready_selectors {
            if let Ok(count) = session.count(selector).await {
                debug!("{}: selector {:?} -> {} nodes", self.profile.name, selector, count);
            }
        }

        let (cards, strategy) = extract_cards(&*session, &self.profile.cards, &self.strategies).await;
        debug!(
            "{}: {} raw cards via {}",
            self.profile.name,
            cards.len(),
            strategy.unwrap_or("none")
        );
        Ok(cards)
    }

    /// Validates raw cards into listings: drops incomplete cards, resolves
    /// hrefs, deduplicates by canonical URL and attaches derived specs.
    pub fn build_listings(&self, cards: Vec<RawCard>) -> (Vec<Listing>, CardStats) {
        let mut stats = CardStats {
            seen: cards.len(),
            ..CardStats::default()
        };
        let mut seen_urls = HashSet::new();
        let mut listings = Vec::new();

        for card in cards {
            let title = card
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| t.chars().count() >= MIN_TITLE_LEN);
            let href = card
                .href
                .as_deref()
                .and_then(|h| clean_href(h, self.profile.origin));
            let price = card.price_text.as_deref().and_then(parse_price_eur);

            let (Some(title), Some(href), Some(price)) = (title, href, price) else {
                debug!(
                    "[drop] {}: title={:?} href={:?} price_text={:?}",
                    self.profile.name, card.title, card.href, card.price_text
                );
                stats.dropped_incomplete += 1;
                continue;
            };

            if !seen_urls.insert(canonical_url(&href)) {
                stats.duplicates += 1;
                continue;
            }

            let specs = extract(title).to_specs_map();
            listings.push(
                Listing::new(self.profile.name, self.profile.country, title, price, href)
                    .with_specs(specs),
            );
        }

        stats.kept = listings.len();
        (listings, stats)
    }
}

#[async_trait]
impl SourceAdapter for RetailerSource {
    fn source_id(&self) -> String {
        self.profile.id.to_string()
    }

    fn source_name(&self) -> String {
        self.profile.name.to_string()
    }

    fn country(&self) -> String {
        self.profile.country.to_string()
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<Listing>> {
        let cards = self.scrape_page(query, page).await?;
        let (listings, stats) = self.build_listings(cards);
        info!(
            "{} kept {} items on page {}; dropped {} with no parseable price/title/url, {} duplicates",
            self.profile.name, stats.kept, page, stats.dropped_incomplete, stats.duplicates
        );
        Ok(listings)
    }

    /// Pages are fetched concurrently, each in its own session, and merged in
    /// page order with cross-page deduplication.
    async fn search_all(&self, query: &str) -> Result<Vec<Listing>> {
        let pages: Vec<u32> = (1..=self.page_count()).collect();
        let results = join_all(pages.iter().map(|page| self.search(query, *page))).await;

        let mut seen_urls = HashSet::new();
        let mut merged = Vec::new();
        let mut first_error: Option<RankerError> = None;
        let mut failed_pages = 0;

        for (page, result) in pages.iter().zip(results) {
            match result {
                Ok(listings) => {
                    for listing in listings {
                        if seen_urls.insert(listing.canonical_url()) {
                            merged.push(listing);
                        }
                    }
                }
                Err(e) => {
                    warn!("{}: page {} failed: {}", self.profile.name, page, e);
                    failed_pages += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if failed_pages == pages.len() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        info!(
            "Pulled {} items from source: {} ({} page(s))",
            merged.len(),
            self.profile.name,
            pages.len()
        );
        Ok(merged)
    }

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: self.source_id(),
            name: self.source_name(),
            country: self.country(),
            website_url: Some(self.profile.origin.to_string()),
            max_pages: self.page_count(),
            tags: self.profile.tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}
