use crate::browser::BrowserDriver;
use crate::config::ScrapeConfig;
use crate::parser::{CardSelectorSpec, RawCard};
use crate::sources::retailer::{CardStats, RetailerProfile, RetailerSource};
use crate::sources::CONSENT_SELECTORS;
use crate::traits::{SourceAdapter, SourceMetadata};
use crate::types::{Listing, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const CDISCOUNT: RetailerProfile = RetailerProfile {
    id: "cdiscount_fr",
    name: "Cdiscount",
    country: "FR",
    origin: "https://www.cdiscount.com",
    search_url: "https://www.cdiscount.com/search/10/{query}.html",
    cards: CardSelectorSpec {
        card: "article[data-e2e='offer-item'], article.offerWrapper, article",
        title: "[data-e2e='lplr-title'], h2",
        link: "a[href]",
        price: "[data-e2e='lplr-price'] .price, [data-e2e='lplr-price']",
        sponsor: Some(".sponsor, [class*='sponsor']"),
        price_scan: "span, div, strong, b, p",
    },
    ready_selectors: &[
        "article[data-e2e='offer-item']",
        "article.offerWrapper",
        "[data-e2e='lplr-title']",
        "article h2",
    ],
    consent_selectors: CONSENT_SELECTORS,
    consent_delay_ms: None,
    consent_max_clicks: None,
    max_pages: 1,
    tags: &["marketplace", "fr"],
};

/// Cdiscount search results. Single page.
pub struct CdiscountSource {
    inner: RetailerSource,
}

impl CdiscountSource {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: ScrapeConfig) -> Self {
        Self {
            inner: RetailerSource::new(CDISCOUNT, driver, config),
        }
    }

    pub fn build_listings(&self, cards: Vec<RawCard>) -> (Vec<Listing>, CardStats) {
        self.inner.build_listings(cards)
    }
}

#[async_trait]
impl SourceAdapter for CdiscountSource {
    fn source_id(&self) -> String {
        self.inner.source_id()
    }

    fn source_name(&self) -> String {
        self.inner.source_name()
    }

    fn country(&self) -> String {
        self.inner.country()
    }

    async fn search(&self, query: &str, page: u32) -> Result<Vec<Listing>> {
        self.inner.search(query, page).await
    }

    async fn search_all(&self, query: &str) -> Result<Vec<Listing>> {
        self.inner.search_all(query).await
    }

    fn metadata(&self) -> SourceMetadata {
        self.inner.metadata()
    }
}
