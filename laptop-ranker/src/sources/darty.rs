use crate::browser::BrowserDriver;
use crate::config::ScrapeConfig;
use crate::parser::CardSelectorSpec;
use crate::sources::retailer::{RetailerProfile, RetailerSource};
use crate::sources::CONSENT_SELECTORS;
use crate::traits::{SourceAdapter, SourceMetadata};
use crate::types::{Listing, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const DARTY: RetailerProfile = RetailerProfile {
    id: "darty_fr",
    name: "Darty",
    country: "FR",
    origin: "https://www.darty.com",
    search_url: "https://www.darty.com/nav/recherche?text={query}",
    cards: CardSelectorSpec {
        card: ".product-list .product",
        title: "a[data-automation-id='product_title'] .reference, a[data-automation-id='product_title'], a.name, .column.center .reference",
        link: "a[data-automation-id='product_title'][href], a.name[href], .column.left a.link[href]",
        price: "[data-automation-id='product_price'], .price_container .price_product .price",
        sponsor: None,
        price_scan: "span, div, strong",
    },
    ready_selectors: &[
        ".product-list .product a[data-automation-id='product_title']",
        ".product-list .product a.name",
    ],
    consent_selectors: CONSENT_SELECTORS,
    // the consent banner is injected late and a second click lands on the page
    consent_delay_ms: Some(2200),
    consent_max_clicks: Some(1),
    max_pages: 1,
    tags: &["retail", "electronics", "fr"],
};

/// Darty search results. Single page.
pub struct DartySource {
    inner: RetailerSource,
}

impl DartySource {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: ScrapeConfig) -> Self {
        Self {
            inner: RetailerSource::new(DARTY, driver, config),
        }
    }
}

#[async_trait]
impl SourceAdapter for DartySource {
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
