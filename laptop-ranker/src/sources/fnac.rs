use crate::browser::BrowserDriver;
use crate::config::ScrapeConfig;
use crate::parser::CardSelectorSpec;
use crate::sources::retailer::{RetailerProfile, RetailerSource};
use crate::sources::CONSENT_SELECTORS;
use crate::traits::{SourceAdapter, SourceMetadata};
use crate::types::{Listing, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const FNAC: RetailerProfile = RetailerProfile {
    id: "fnac_fr",
    name: "Fnac",
    country: "FR",
    origin: "https://www.fnac.com",
    search_url: "https://www.fnac.com/SearchResult/ResultList.aspx?SCat=0%211&Search={query}&PageIndex={page}",
    cards: CardSelectorSpec {
        card: "[data-testid='product-item'], .Article-itemGroup, li.Article-item, div.Article-item",
        title: "[data-testid='product-item-title'], .Article-title",
        link: "a[data-testid='product-item-link'], a.Article-title, a[href*='/p-']",
        price: "[data-testid='product-price'], .userPrice, [data-testid='pricing-zone'], .f-priceBox-price",
        sponsor: Some("[data-testid='sponsored-label'], .sponsored"),
        price_scan: "span, div, strong",
    },
    ready_selectors: &[
        "[data-testid='product-item'] a[data-testid='product-item-link']",
        ".Article-itemGroup a.Article-title",
    ],
    consent_selectors: CONSENT_SELECTORS,
    consent_delay_ms: None,
    consent_max_clicks: None,
    max_pages: 3,
    tags: &["retail", "fr"],
};

/// Fnac search results, paginated through `PageIndex`.
pub struct FnacSource {
    inner: RetailerSource,
}

impl FnacSource {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: ScrapeConfig) -> Self {
        Self {
            inner: RetailerSource::new(FNAC, driver, config),
        }
    }
}

#[async_trait]
impl SourceAdapter for FnacSource {
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
